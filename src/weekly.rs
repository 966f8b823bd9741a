use crate::planning::{PlanningInput, PlanningTask};
use crate::projection::ProjectionError;
use crate::vacation::VacationPeriod;
use chrono::{Duration, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimelineTableError {
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error("timeline table error: {0}")]
    Frame(#[from] PolarsError),
}

/// One row per calendar week of the project: which task the straight-line
/// timeline places there, and the vacation overlapping that week.
pub fn weekly_timeline(
    input: &PlanningInput,
    vacations: &[VacationPeriod],
) -> Result<DataFrame, TimelineTableError> {
    let (start, end) = input.date_window()?;
    let hours = input.sanitized_hours();
    let total_hours: f64 = hours.iter().sum();
    let span_days = (end - start).num_days();
    let week_count = (span_days + 6) / 7;

    let mut weeks: Vec<i32> = Vec::with_capacity(week_count as usize);
    let mut week_starts: Vec<i32> = Vec::with_capacity(week_count as usize);
    let mut week_ends: Vec<i32> = Vec::with_capacity(week_count as usize);
    let mut tasks: Vec<Option<&'static str>> = Vec::with_capacity(week_count as usize);
    let mut vacation_names: Vec<Option<String>> = Vec::with_capacity(week_count as usize);

    for week in 0..week_count {
        let week_start = start + Duration::days(week * 7);
        let week_end = (week_start + Duration::days(6)).min(end);
        let position = (week * 7) as f64 / span_days as f64;

        weeks.push(week as i32 + 1);
        week_starts.push(date_to_i32(week_start));
        week_ends.push(date_to_i32(week_end));
        tasks.push(task_at(&hours, total_hours, position).map(PlanningTask::as_str));
        vacation_names.push(
            vacations
                .iter()
                .find(|period| period.overlaps(week_start, week_end))
                .map(|period| period.name.clone()),
        );
    }

    Ok(build_frame(
        weeks,
        week_starts,
        week_ends,
        tasks,
        vacation_names,
    )?)
}

fn build_frame(
    weeks: Vec<i32>,
    week_starts: Vec<i32>,
    week_ends: Vec<i32>,
    tasks: Vec<Option<&'static str>>,
    vacations: Vec<Option<String>>,
) -> PolarsResult<DataFrame> {
    let columns = vec![
        Series::new(PlSmallStr::from_static("week"), weeks).into_column(),
        Series::new(PlSmallStr::from_static("week_start"), week_starts)
            .cast(&DataType::Date)?
            .into_column(),
        Series::new(PlSmallStr::from_static("week_end"), week_ends)
            .cast(&DataType::Date)?
            .into_column(),
        Series::new(PlSmallStr::from_static("task"), tasks).into_column(),
        Series::new(PlSmallStr::from_static("vacation"), vacations).into_column(),
    ];
    DataFrame::new(columns)
}

/// Task whose cumulative-hours interval contains `position` (0..1 of the span).
fn task_at(hours: &[f64], total_hours: f64, position: f64) -> Option<PlanningTask> {
    if total_hours <= 0.0 {
        return None;
    }
    let mut cumulative = 0.0;
    for task in PlanningTask::ALL {
        let task_hours = hours[task.index()];
        cumulative += task_hours;
        if task_hours > 0.0 && position < cumulative / total_hours {
            return Some(task);
        }
    }
    PlanningTask::ALL
        .into_iter()
        .rev()
        .find(|task| hours[task.index()] > 0.0)
}

fn date_to_i32(date: NaiveDate) -> i32 {
    (date - epoch()).num_days() as i32
}

/// Read back a `Date` cell of the weekly frame.
pub fn date_at(df: &DataFrame, column: &str, row_idx: usize) -> PolarsResult<Option<NaiveDate>> {
    let days = df.column(column)?.date()?.get(row_idx);
    Ok(days.map(|d| epoch() + Duration::days(i64::from(d))))
}

fn epoch() -> NaiveDate {
    NaiveDate::default()
}
