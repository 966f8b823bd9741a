use crate::planning::{PlanningInput, PlanningTask};
use crate::projection::ProjectionError;
use crate::steps::WorkflowStep;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SECONDS_PER_DAY: i64 = 86_400;

/// Projected due date for the student step that closes a planning task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub step: WorkflowStep,
    pub task: PlanningTask,
    pub date: NaiveDate,
}

/// The five milestones, in task order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Milestones {
    entries: Vec<Milestone>,
}

impl Milestones {
    pub fn get(&self, step: WorkflowStep) -> Option<NaiveDate> {
        self.entries
            .iter()
            .find(|milestone| milestone.step == step)
            .map(|milestone| milestone.date)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Milestone> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_cli_summary(&self) -> String {
        self.entries
            .iter()
            .map(|m| format!("step{}={}", m.step.number(), m.date))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl<'a> IntoIterator for &'a Milestones {
    type Item = &'a Milestone;
    type IntoIter = std::slice::Iter<'a, Milestone>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// The student step whose due date falls at the end of each planning task.
pub fn checkpoint_step(task: PlanningTask) -> WorkflowStep {
    match task {
        PlanningTask::NeedsExpression => WorkflowStep::NeedsExpression,
        PlanningTask::SpecificationWriting => WorkflowStep::Specifications,
        PlanningTask::SolutionResearch => WorkflowStep::TestSheet,
        PlanningTask::Modeling => WorkflowStep::Logbook,
        PlanningTask::Validation => WorkflowStep::Report,
    }
}

/// Project a due date per checkpoint by straight-line interpolation of the
/// cumulative hours over the calendar span. Vacations do not shift the dates.
///
/// Returns `Ok(None)` when no hours are planned yet.
pub fn compute_milestones(input: &PlanningInput) -> Result<Option<Milestones>, ProjectionError> {
    let (start, end) = input.date_window()?;
    let hours = input.sanitized_hours();
    let total_hours: f64 = hours.iter().sum();
    if total_hours <= 0.0 {
        return Ok(None);
    }

    let span_seconds = (end - start).num_days() * SECONDS_PER_DAY;
    let mut cumulative = 0.0;
    let mut entries = Vec::with_capacity(PlanningTask::ALL.len());
    for task in PlanningTask::ALL {
        cumulative += hours[task.index()];
        let fraction = (cumulative / total_hours).clamp(0.0, 1.0);
        let elapsed = (fraction * span_seconds as f64).round() as i64;
        let date = (start + Duration::seconds(elapsed)).clamp(start, end);
        entries.push(Milestone {
            step: checkpoint_step(task),
            task,
            date,
        });
    }

    let milestones = Milestones { entries };
    debug!(milestones = %milestones.to_cli_summary(), "projected milestones");
    Ok(Some(milestones))
}
