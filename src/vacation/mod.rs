use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::str::FromStr;
use thiserror::Error;

pub mod dataset;
#[cfg(feature = "remote_calendar")]
pub mod remote;

pub use dataset::{load_vacations_from_csv, read_vacations_csv};
#[cfg(feature = "remote_calendar")]
pub use remote::RemoteVacationSource;

/// Public records API of the national school-calendar dataset.
pub const DATASET_RECORDS_ENDPOINT: &str = "https://data.education.gouv.fr/api/explore/v2.1/catalog/datasets/fr-en-calendrier-scolaire/records";

/// French school-holiday zone. `None` disables the vacation overlay.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum VacationZone {
    #[default]
    #[serde(rename = "none")]
    None,
    A,
    B,
    C,
}

impl VacationZone {
    pub const ZONES: [VacationZone; 3] = [VacationZone::A, VacationZone::B, VacationZone::C];

    pub fn as_str(self) -> &'static str {
        match self {
            VacationZone::None => "none",
            VacationZone::A => "A",
            VacationZone::B => "B",
            VacationZone::C => "C",
        }
    }

    /// Label used by the national calendar dataset ("Zone A").
    pub fn dataset_label(self) -> Option<&'static str> {
        match self {
            VacationZone::None => None,
            VacationZone::A => Some("Zone A"),
            VacationZone::B => Some("Zone B"),
            VacationZone::C => Some("Zone C"),
        }
    }
}

impl fmt::Display for VacationZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VacationZone {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let bare = trimmed
            .strip_prefix("Zone ")
            .or_else(|| trimmed.strip_prefix("zone "))
            .unwrap_or(trimmed);
        match bare.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(VacationZone::None),
            "a" => Ok(VacationZone::A),
            "b" => Ok(VacationZone::B),
            "c" => Ok(VacationZone::C),
            _ => Err(format!("unknown vacation zone '{trimmed}' (expected none, A, B or C)")),
        }
    }
}

/// A named school-holiday period; both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VacationPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub name: String,
}

impl VacationPeriod {
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start <= end && self.end >= start
    }
}

#[derive(Debug, Error)]
pub enum VacationError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("http error: {0}")]
    Http(String),
    #[error("invalid vacation data: {0}")]
    InvalidData(String),
}

/// Read-only lookup of the vacation periods for a zone within a date span.
pub trait VacationSource {
    fn periods(
        &self,
        zone: VacationZone,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<VacationPeriod>, VacationError>;
}

/// In-memory vacation periods per zone, kept sorted and de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VacationCalendar {
    zones: BTreeMap<VacationZone, Vec<VacationPeriod>>,
}

impl VacationCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Periods with an inverted range are dropped; adding to `VacationZone::None` is a no-op.
    pub fn add_period(&mut self, zone: VacationZone, period: VacationPeriod) {
        if zone == VacationZone::None || period.end < period.start {
            return;
        }
        let periods = self.zones.entry(zone).or_default();
        if let Err(pos) = periods.binary_search(&period) {
            periods.insert(pos, period);
        }
    }

    pub fn add_periods<I>(&mut self, zone: VacationZone, periods: I)
    where
        I: IntoIterator<Item = VacationPeriod>,
    {
        for period in periods {
            self.add_period(zone, period);
        }
    }

    pub fn zone_periods(&self, zone: VacationZone) -> &[VacationPeriod] {
        self.zones.get(&zone).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn overlapping(
        &self,
        zone: VacationZone,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<VacationPeriod> {
        self.zone_periods(zone)
            .iter()
            .filter(|period| period.overlaps(start, end))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.zones.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VacationSource for VacationCalendar {
    fn periods(
        &self,
        zone: VacationZone,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<VacationPeriod>, VacationError> {
        Ok(self.overlapping(zone, start, end))
    }
}
