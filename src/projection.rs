use crate::planning::{PlanningInput, PlanningTask, TASK_COUNT};
use crate::vacation::VacationPeriod;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// One classroom session per week.
pub const HOURS_PER_WEEK: f64 = 1.5;

const DAYS_PER_WEEK: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDate {
    Start,
    End,
    Both,
}

impl fmt::Display for MissingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingDate::Start => f.write_str("project start date"),
            MissingDate::End => f.write_str("project end date"),
            MissingDate::Both => f.write_str("project start and end dates"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("{0} not set; pick dates to compute the timeline")]
    MissingDate(MissingDate),
    #[error("project end date {end} must be after project start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Hours of one task and its share of the timeline bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAllocation {
    pub task: PlanningTask,
    pub hours: f64,
    pub share: f64,
    pub weeks: f64,
}

/// A vacation period placed on the timeline bar, clipped to the project span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationOverlay {
    pub period: VacationPeriod,
    pub offset: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineProjection {
    pub total_hours: f64,
    pub total_weeks_needed: u32,
    pub allocations: Vec<TaskAllocation>,
    /// Absent until both project dates are set.
    pub weeks_available: Option<f64>,
    pub capacity_exceeded: bool,
    pub vacations: Vec<VacationOverlay>,
}

impl TimelineProjection {
    pub fn shares(&self) -> [f64; TASK_COUNT] {
        let mut shares = [0.0; TASK_COUNT];
        for allocation in &self.allocations {
            shares[allocation.task.index()] = allocation.share;
        }
        shares
    }

    pub fn overlapping_vacations(&self) -> impl Iterator<Item = &VacationPeriod> {
        self.vacations.iter().map(|overlay| &overlay.period)
    }

    pub fn is_computable(&self) -> bool {
        self.weeks_available.is_some()
    }
}

pub fn weeks_needed(total_hours: f64) -> u32 {
    if total_hours <= 0.0 {
        return 0;
    }
    (total_hours / HOURS_PER_WEEK).ceil() as u32
}

pub fn weeks_between(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / DAYS_PER_WEEK
}

/// Distribute the task hours over the project span and overlay vacations.
///
/// An inverted date range is rejected before anything is computed. With a
/// date missing the hour allocation is still returned, without capacity
/// check or vacation overlay.
pub fn compute_projection(
    input: &PlanningInput,
    vacations: &[VacationPeriod],
) -> Result<TimelineProjection, ProjectionError> {
    input.validate_range()?;

    let hours = input.sanitized_hours();
    let total_hours: f64 = hours.iter().sum();
    let total_weeks_needed = weeks_needed(total_hours);

    let allocations = PlanningTask::ALL
        .iter()
        .map(|&task| {
            let task_hours = hours[task.index()];
            let share = if total_hours > 0.0 {
                task_hours / total_hours
            } else {
                0.0
            };
            TaskAllocation {
                task,
                hours: task_hours,
                share,
                weeks: task_hours / HOURS_PER_WEEK,
            }
        })
        .collect();

    let (weeks_available, capacity_exceeded, overlays) = match input.date_window() {
        Ok((start, end)) => {
            let available = weeks_between(start, end);
            let exceeded = total_hours > 0.0 && f64::from(total_weeks_needed) > available;
            (Some(available), exceeded, vacation_overlays(start, end, vacations))
        }
        Err(_) => (None, false, Vec::new()),
    };

    debug!(
        total_hours,
        total_weeks_needed,
        ?weeks_available,
        capacity_exceeded,
        vacations = overlays.len(),
        "computed timeline projection"
    );

    Ok(TimelineProjection {
        total_hours,
        total_weeks_needed,
        allocations,
        weeks_available,
        capacity_exceeded,
        vacations: overlays,
    })
}

fn vacation_overlays(
    start: NaiveDate,
    end: NaiveDate,
    vacations: &[VacationPeriod],
) -> Vec<VacationOverlay> {
    let span = (end - start).num_days() as f64;
    let mut overlays: Vec<VacationOverlay> = vacations
        .iter()
        .filter(|period| period.overlaps(start, end))
        .map(|period| {
            let clipped_start = period.start.max(start);
            let clipped_end = period.end.min(end);
            VacationOverlay {
                period: period.clone(),
                offset: (clipped_start - start).num_days() as f64 / span,
                width: (clipped_end - clipped_start).num_days() as f64 / span,
            }
        })
        .collect();
    overlays.sort_by(|a, b| a.period.cmp(&b.period));
    overlays
}
