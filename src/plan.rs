use crate::milestones::{Milestones, compute_milestones};
use crate::planning::{PlanningInput, PlanningTask, TASK_COUNT};
use crate::projection::{ProjectionError, TimelineProjection, compute_projection};
use crate::steps::{ResolvedStep, StepConfig, StepSchedule, WorkflowStep};
use crate::vacation::{VacationError, VacationPeriod, VacationSource, VacationZone};
use crate::weekly::{TimelineTableError, weekly_timeline};
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error("vacation lookup failed: {0}")]
    Vacation(#[from] VacationError),
    #[error(transparent)]
    Table(#[from] TimelineTableError),
    #[error("{0}")]
    Invalid(String),
}

/// Everything the renderer needs after one recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub projection: TimelineProjection,
    pub milestones: Option<Milestones>,
    pub steps: Vec<ResolvedStep>,
    /// Shown instead of the timeline while a date is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_hours: f64,
    pub weeks_needed: u32,
    pub weeks_available: Option<f64>,
    pub capacity_exceeded: bool,
    pub vacation_count: usize,
    pub milestone_chain: Option<String>,
}

impl PlanSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("hours={}", self.total_hours));
        parts.push(format!("weeks_needed={}", self.weeks_needed));
        if let Some(available) = self.weeks_available {
            parts.push(format!("weeks_available={available:.2}"));
        }
        if self.capacity_exceeded {
            parts.push("capacity_exceeded".to_string());
        }
        if self.vacation_count > 0 {
            parts.push(format!("vacations={}", self.vacation_count));
        }
        if let Some(chain) = &self.milestone_chain {
            parts.push(format!("milestones={chain}"));
        }
        parts.join(", ")
    }
}

/// A project's planning plus the supervisor's per-step date settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPlan {
    planning: PlanningInput,
    #[serde(default)]
    steps: StepSchedule,
}

impl ProjectPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Task hours are sanitized on the way in; only the date range can fail.
    pub fn from_parts(planning: PlanningInput, steps: StepSchedule) -> Result<Self, PlanError> {
        planning.validate_range()?;
        Ok(Self {
            planning: planning.sanitized(),
            steps,
        })
    }

    pub fn planning(&self) -> &PlanningInput {
        &self.planning
    }

    pub fn steps(&self) -> &StepSchedule {
        &self.steps
    }

    pub fn set_planning(&mut self, planning: PlanningInput) -> Result<(), ProjectionError> {
        planning.validate_range()?;
        self.planning = planning.sanitized();
        Ok(())
    }

    fn update_planning_with<F>(&mut self, mutator: F) -> Result<(), ProjectionError>
    where
        F: FnOnce(&mut PlanningInput),
    {
        let mut planning = self.planning.clone();
        mutator(&mut planning);
        self.set_planning(planning)
    }

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.planning.project_name = name.into();
    }

    pub fn set_project_dates(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<(), ProjectionError> {
        self.update_planning_with(|planning| {
            planning.project_start = start;
            planning.project_end = end;
        })
    }

    pub fn set_vacation_zone(&mut self, zone: VacationZone) {
        self.planning.vacation_zone = zone;
    }

    pub fn set_task_hours(&mut self, task: PlanningTask, hours: f64) {
        self.planning.set_hours(task, hours);
    }

    pub fn set_all_task_hours(&mut self, hours: [f64; TASK_COUNT]) {
        for task in PlanningTask::ALL {
            self.planning.set_hours(task, hours[task.index()]);
        }
    }

    pub fn set_step_config(&mut self, step: WorkflowStep, config: StepConfig) -> Result<(), PlanError> {
        self.steps.set_config(step, config).map_err(PlanError::Invalid)
    }

    pub fn set_step_enabled(&mut self, step: WorkflowStep, enabled: bool) -> Result<(), PlanError> {
        self.steps.set_enabled(step, enabled).map_err(PlanError::Invalid)
    }

    pub fn set_submission_date(
        &mut self,
        step: WorkflowStep,
        date: Option<NaiveDate>,
    ) -> Result<(), PlanError> {
        self.steps
            .set_submission_date(step, date)
            .map_err(PlanError::Invalid)
    }

    pub fn set_deadline_date(
        &mut self,
        step: WorkflowStep,
        date: Option<NaiveDate>,
    ) -> Result<(), PlanError> {
        self.steps
            .set_deadline_date(step, date)
            .map_err(PlanError::Invalid)
    }

    /// Vacation periods for the plan's zone and span; empty while a date is missing.
    pub fn vacations<S>(&self, source: &S) -> Result<Vec<VacationPeriod>, PlanError>
    where
        S: VacationSource + ?Sized,
    {
        match self.planning.date_window() {
            Ok((start, end)) => Ok(source.periods(self.planning.vacation_zone, start, end)?),
            Err(ProjectionError::MissingDate(_)) => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// `Ok(None)` while a date is missing or no hours are planned.
    pub fn milestones(&self) -> Result<Option<Milestones>, ProjectionError> {
        match compute_milestones(&self.planning) {
            Err(ProjectionError::MissingDate(_)) => Ok(None),
            other => other,
        }
    }

    pub fn resolved_steps(&self) -> Result<Vec<ResolvedStep>, ProjectionError> {
        let milestones = self.milestones()?;
        Ok(self.steps.resolve(milestones.as_ref()))
    }

    pub fn report<S>(&self, source: &S) -> Result<PlanReport, PlanError>
    where
        S: VacationSource + ?Sized,
    {
        let vacations = self.vacations(source)?;
        self.report_with_vacations(&vacations)
    }

    pub fn report_with_vacations(
        &self,
        vacations: &[VacationPeriod],
    ) -> Result<PlanReport, PlanError> {
        let projection = compute_projection(&self.planning, vacations)?;
        let notice = match self.planning.date_window() {
            Err(err @ ProjectionError::MissingDate(_)) => Some(err.to_string()),
            _ => None,
        };
        let milestones = self.milestones()?;
        let steps = self.steps.resolve(milestones.as_ref());
        Ok(PlanReport {
            projection,
            milestones,
            steps,
            notice,
        })
    }

    pub fn weekly_timeline<S>(&self, source: &S) -> Result<DataFrame, PlanError>
    where
        S: VacationSource + ?Sized,
    {
        let vacations = self.vacations(source)?;
        Ok(weekly_timeline(&self.planning, &vacations)?)
    }

    pub fn refresh<S>(&self, source: &S) -> Result<PlanSummary, PlanError>
    where
        S: VacationSource + ?Sized,
    {
        let report = self.report(source)?;
        let summary = PlanSummary {
            total_hours: report.projection.total_hours,
            weeks_needed: report.projection.total_weeks_needed,
            weeks_available: report.projection.weeks_available,
            capacity_exceeded: report.projection.capacity_exceeded,
            vacation_count: report.projection.vacations.len(),
            milestone_chain: report.milestones.as_ref().map(Milestones::to_cli_summary),
        };
        debug!(summary = %summary.to_cli_summary(), "plan refreshed");
        Ok(summary)
    }

    /// Checks applied before a plan is persisted and after one is read back.
    pub fn validate(&self) -> Result<(), PlanError> {
        self.planning.validate_range()?;
        for (task, hours) in PlanningTask::ALL.iter().zip(self.planning.task_hours) {
            if !hours.is_finite() || hours < 0.0 {
                return Err(PlanError::Invalid(format!(
                    "task {} has invalid hours {hours}",
                    task.as_str()
                )));
            }
        }
        for (step, config) in self.steps.configs() {
            if let (Some(submission), Some(deadline)) = (config.submission_date, config.deadline_date)
            {
                if deadline < submission {
                    return Err(PlanError::Invalid(format!(
                        "step {} deadline {deadline} is before its submission date {submission}",
                        step.number()
                    )));
                }
            }
        }
        Ok(())
    }
}
