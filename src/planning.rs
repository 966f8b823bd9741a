use crate::projection::{MissingDate, ProjectionError};
use crate::vacation::VacationZone;
use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TASK_COUNT: usize = 5;

/// Ceiling applied to each task's hours so totals stay finite.
pub const MAX_TASK_HOURS: f64 = 1_000_000.0;

const DEFAULT_PROJECT_NAME: &str = "New Project";

/// The five planning tasks, in the fixed order the timeline walks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningTask {
    NeedsExpression,
    SpecificationWriting,
    SolutionResearch,
    Modeling,
    Validation,
}

impl PlanningTask {
    pub const ALL: [PlanningTask; TASK_COUNT] = [
        PlanningTask::NeedsExpression,
        PlanningTask::SpecificationWriting,
        PlanningTask::SolutionResearch,
        PlanningTask::Modeling,
        PlanningTask::Validation,
    ];

    pub fn index(self) -> usize {
        match self {
            PlanningTask::NeedsExpression => 0,
            PlanningTask::SpecificationWriting => 1,
            PlanningTask::SolutionResearch => 2,
            PlanningTask::Modeling => 3,
            PlanningTask::Validation => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlanningTask::NeedsExpression => "needs_expression",
            PlanningTask::SpecificationWriting => "specification_writing",
            PlanningTask::SolutionResearch => "solution_research",
            PlanningTask::Modeling => "modeling",
            PlanningTask::Validation => "validation",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlanningTask::NeedsExpression => "Needs expression",
            PlanningTask::SpecificationWriting => "Specification writing",
            PlanningTask::SolutionResearch => "Solution research",
            PlanningTask::Modeling => "Modeling / prototyping",
            PlanningTask::Validation => "Validation",
        }
    }
}

impl fmt::Display for PlanningTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanningTask {
    type Err = String;

    /// Accepts the snake_case key or the 1-based position (`1`..`5`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Ok(position) = trimmed.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|idx| PlanningTask::ALL.get(idx).copied())
                .ok_or_else(|| format!("task position must be between 1 and {TASK_COUNT}"));
        }
        PlanningTask::ALL
            .into_iter()
            .find(|task| task.as_str() == trimmed)
            .ok_or_else(|| format!("unknown planning task '{trimmed}'"))
    }
}

/// Supervisor-entered planning: project span, vacation zone and hour budget per task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningInput {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_end: Option<NaiveDate>,
    #[serde(default)]
    pub vacation_zone: VacationZone,
    #[serde(default, deserialize_with = "deserialize_task_hours")]
    pub task_hours: [f64; TASK_COUNT],
}

impl Default for PlanningInput {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            project_start: None,
            project_end: None,
            vacation_zone: VacationZone::None,
            task_hours: [0.0; TASK_COUNT],
        }
    }
}

impl PlanningInput {
    pub fn new(start: NaiveDate, end: NaiveDate, hours: [f64; TASK_COUNT]) -> Self {
        Self {
            project_start: Some(start),
            project_end: Some(end),
            task_hours: hours,
            ..Self::default()
        }
    }

    /// Hours for a task; negative or non-finite entries read as zero.
    pub fn hours(&self, task: PlanningTask) -> f64 {
        sanitize_hours(self.task_hours[task.index()])
    }

    pub fn set_hours(&mut self, task: PlanningTask, hours: f64) {
        self.task_hours[task.index()] = sanitize_hours(hours);
    }

    /// The same planning with every task's hours cleaned.
    pub fn sanitized(mut self) -> Self {
        self.task_hours = self.sanitized_hours();
        self
    }

    pub fn sanitized_hours(&self) -> [f64; TASK_COUNT] {
        PlanningTask::ALL.map(|task| self.hours(task))
    }

    pub fn total_hours(&self) -> f64 {
        self.sanitized_hours().iter().sum()
    }

    /// Both dates with the range checked; a missing date is reported before an inverted one.
    pub fn date_window(&self) -> Result<(NaiveDate, NaiveDate), ProjectionError> {
        match (self.project_start, self.project_end) {
            (Some(start), Some(end)) => {
                if end <= start {
                    Err(ProjectionError::InvalidRange { start, end })
                } else {
                    Ok((start, end))
                }
            }
            (None, Some(_)) => Err(ProjectionError::MissingDate(MissingDate::Start)),
            (Some(_), None) => Err(ProjectionError::MissingDate(MissingDate::End)),
            (None, None) => Err(ProjectionError::MissingDate(MissingDate::Both)),
        }
    }

    /// Only the range check: passes when a date is still missing.
    pub fn validate_range(&self) -> Result<(), ProjectionError> {
        match (self.project_start, self.project_end) {
            (Some(start), Some(end)) if end <= start => {
                Err(ProjectionError::InvalidRange { start, end })
            }
            _ => Ok(()),
        }
    }
}

fn sanitize_hours(hours: f64) -> f64 {
    if hours.is_finite() && hours > 0.0 {
        hours.min(MAX_TASK_HOURS)
    } else {
        0.0
    }
}

fn default_project_name() -> String {
    DEFAULT_PROJECT_NAME.to_string()
}

/// `null` entries read as zero and a short list is padded with zeros.
fn deserialize_task_hours<'de, D>(deserializer: D) -> Result<[f64; TASK_COUNT], D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
    if raw.len() > TASK_COUNT {
        return Err(D::Error::invalid_length(raw.len(), &"at most 5 task hours"));
    }
    let mut hours = [0.0; TASK_COUNT];
    for (slot, value) in hours.iter_mut().zip(raw) {
        *slot = value.unwrap_or(0.0);
    }
    Ok(hours)
}
