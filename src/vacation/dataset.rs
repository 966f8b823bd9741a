//! Reader for the national school-calendar dataset (`fr-en-calendrier-scolaire`).
//!
//! The official CSV export is `;`-delimited with French headers; the records API
//! uses snake_case field names. Both go through [`DatasetRecord`].

use super::{VacationCalendar, VacationError, VacationPeriod, VacationZone};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

const STAFF_ONLY_POPULATION: &str = "Enseignants";

/// One dataset row, as exported or as returned by the records API.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetRecord {
    pub description: String,
    #[serde(default)]
    pub population: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub zones: String,
}

impl DatasetRecord {
    /// `Ok(None)` for rows that do not describe a pupil holiday in zone A, B or C.
    pub fn into_period(self) -> Result<Option<(VacationZone, VacationPeriod)>, VacationError> {
        if self
            .population
            .as_deref()
            .is_some_and(|p| p.trim() == STAFF_ONLY_POPULATION)
        {
            return Ok(None);
        }
        let zone = match self.zones.parse::<VacationZone>() {
            Ok(VacationZone::None) | Err(_) => return Ok(None),
            Ok(zone) => zone,
        };
        let start = parse_dataset_date(&self.start_date)?;
        let end = parse_dataset_date(&self.end_date)?;
        if end < start {
            return Err(VacationError::InvalidData(format!(
                "period '{}' ends {end} before it starts {start}",
                self.description
            )));
        }
        let name = self.description.trim().to_string();
        Ok(Some((zone, VacationPeriod::new(name, start, end))))
    }
}

/// Dataset timestamps are Paris midnights written in UTC; +02:00 lands both
/// winter (23:00Z) and summer (22:00Z) values on the intended day.
pub fn parse_dataset_date(input: &str) -> Result<NaiveDate, VacationError> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    let paris = FixedOffset::east_opt(2 * 3600)
        .ok_or_else(|| VacationError::InvalidData("invalid fixed offset".into()))?;
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&paris).date_naive())
        .map_err(|e| VacationError::InvalidData(format!("invalid date '{trimmed}': {e}")))
}

fn header_key(header: &str) -> Option<&'static str> {
    let normalized = header.trim().trim_start_matches('\u{feff}').to_lowercase();
    match normalized.as_str() {
        "description" => Some("description"),
        "population" => Some("population"),
        "date de début" | "date de debut" | "start_date" => Some("start_date"),
        "date de fin" | "end_date" => Some("end_date"),
        "zones" | "zone" => Some("zones"),
        _ => None,
    }
}

/// Parse a dataset CSV export into a calendar. Unusable rows are skipped with a warning.
pub fn read_vacations_csv<R: Read>(mut reader: R) -> Result<VacationCalendar, VacationError> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    let first_line = raw.lines().next().unwrap_or_default();
    let delimiter = if first_line.contains(';') { b';' } else { b',' };

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let headers = csv_reader.headers()?.clone();
    let mut columns: Vec<(usize, &'static str)> = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if let Some(key) = header_key(header) {
            columns.push((idx, key));
        }
    }
    for required in ["description", "start_date", "end_date", "zones"] {
        if !columns.iter().any(|(_, key)| *key == required) {
            return Err(VacationError::InvalidData(format!(
                "vacation dataset is missing the '{required}' column"
            )));
        }
    }
    let column = |record: &csv::StringRecord, key: &str| -> String {
        columns
            .iter()
            .find(|(_, k)| *k == key)
            .and_then(|(idx, _)| record.get(*idx))
            .unwrap_or_default()
            .to_string()
    };

    let mut calendar = VacationCalendar::new();
    let mut skipped = 0usize;
    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let population = column(&record, "population");
        let entry = DatasetRecord {
            description: column(&record, "description"),
            population: (!population.trim().is_empty()).then_some(population),
            start_date: column(&record, "start_date"),
            end_date: column(&record, "end_date"),
            zones: column(&record, "zones"),
        };
        match entry.into_period() {
            Ok(Some((zone, period))) => calendar.add_period(zone, period),
            Ok(None) => skipped += 1,
            Err(err) => {
                warn!(row = row + 2, error = %err, "skipping vacation dataset row");
                skipped += 1;
            }
        }
    }
    debug!(periods = calendar.len(), skipped, "loaded vacation dataset");
    Ok(calendar)
}

pub fn load_vacations_from_csv<P: AsRef<Path>>(path: P) -> Result<VacationCalendar, VacationError> {
    let file = File::open(path)?;
    read_vacations_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_dates_land_on_the_paris_day() {
        let winter = parse_dataset_date("2025-12-19T23:00:00+00:00").unwrap();
        let summer = parse_dataset_date("2026-07-03T22:00:00+00:00").unwrap();
        let plain = parse_dataset_date(" 2026-02-07 ").unwrap();
        assert_eq!(winter, NaiveDate::from_ymd_opt(2025, 12, 20).unwrap());
        assert_eq!(summer, NaiveDate::from_ymd_opt(2026, 7, 4).unwrap());
        assert_eq!(plain, NaiveDate::from_ymd_opt(2026, 2, 7).unwrap());
        assert!(parse_dataset_date("19/12/2025").is_err());
    }

    #[test]
    fn staff_only_rows_are_skipped() {
        let record = DatasetRecord {
            description: "Prérentrée des enseignants".into(),
            population: Some("Enseignants".into()),
            start_date: "2025-08-29".into(),
            end_date: "2025-08-29".into(),
            zones: "Zone B".into(),
        };
        assert!(record.into_period().unwrap().is_none());
    }
}
