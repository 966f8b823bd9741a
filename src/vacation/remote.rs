use super::dataset::DatasetRecord;
use super::{
    DATASET_RECORDS_ENDPOINT, VacationCalendar, VacationError, VacationPeriod, VacationSource,
    VacationZone,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

const PAGE_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct RecordsPage {
    #[serde(default)]
    total_count: usize,
    #[serde(default)]
    results: Vec<DatasetRecord>,
}

/// Queries the public school-calendar records API on every lookup.
///
/// The blocking client is built per lookup so it is created and dropped on
/// the calling thread, never inside an async executor.
pub struct RemoteVacationSource {
    endpoint: String,
}

impl RemoteVacationSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn where_clause(label: &str, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "zones=\"{label}\" AND start_date<=date'{}' AND end_date>=date'{}'",
            end.format("%Y-%m-%d"),
            start.format("%Y-%m-%d")
        )
    }

    fn fetch_page(
        &self,
        client: &reqwest::blocking::Client,
        filter: &str,
        offset: usize,
    ) -> Result<RecordsPage, VacationError> {
        let limit = PAGE_LIMIT.to_string();
        let offset = offset.to_string();
        let response = client
            .get(&self.endpoint)
            .query(&[
                ("where", filter),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
                ("order_by", "start_date"),
            ])
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| VacationError::Http(err.to_string()))?;
        response
            .json::<RecordsPage>()
            .map_err(|err| VacationError::Http(err.to_string()))
    }
}

impl Default for RemoteVacationSource {
    fn default() -> Self {
        Self::new(DATASET_RECORDS_ENDPOINT)
    }
}

impl VacationSource for RemoteVacationSource {
    fn periods(
        &self,
        zone: VacationZone,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<VacationPeriod>, VacationError> {
        let Some(label) = zone.dataset_label() else {
            return Ok(Vec::new());
        };
        let filter = Self::where_clause(label, start, end);
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|err| VacationError::Http(err.to_string()))?;
        let mut calendar = VacationCalendar::new();
        let mut offset = 0;
        loop {
            let page = self.fetch_page(&client, &filter, offset)?;
            let fetched = page.results.len();
            debug!(offset, fetched, total = page.total_count, "fetched vacation records");
            for record in page.results {
                if let Some((record_zone, period)) = record.into_period()? {
                    calendar.add_period(record_zone, period);
                }
            }
            offset += fetched;
            if fetched == 0 || offset >= page.total_count {
                break;
            }
        }
        let periods = calendar.overlapping(zone, start, end);
        info!(zone = %zone, count = periods.len(), "vacation periods retrieved");
        Ok(periods)
    }
}
