use crate::milestones::Milestones;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The eight pages of the project workflow, identified by their step number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WorkflowStep {
    Description,
    NeedsAnalysis,
    Planning,
    Specifications,
    TestSheet,
    Report,
    NeedsExpression,
    Logbook,
}

impl WorkflowStep {
    pub const ALL: [WorkflowStep; 8] = [
        WorkflowStep::Description,
        WorkflowStep::NeedsAnalysis,
        WorkflowStep::Planning,
        WorkflowStep::Specifications,
        WorkflowStep::TestSheet,
        WorkflowStep::Report,
        WorkflowStep::NeedsExpression,
        WorkflowStep::Logbook,
    ];

    /// Steps filled in by students, in step-number order.
    pub const STUDENT: [WorkflowStep; 5] = [
        WorkflowStep::Specifications,
        WorkflowStep::TestSheet,
        WorkflowStep::Report,
        WorkflowStep::NeedsExpression,
        WorkflowStep::Logbook,
    ];

    pub fn number(self) -> u8 {
        match self {
            WorkflowStep::Description => 1,
            WorkflowStep::NeedsAnalysis => 2,
            WorkflowStep::Planning => 3,
            WorkflowStep::Specifications => 4,
            WorkflowStep::TestSheet => 5,
            WorkflowStep::Report => 6,
            WorkflowStep::NeedsExpression => 7,
            WorkflowStep::Logbook => 8,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(usize::from(idx)).copied())
    }

    pub fn name(self) -> &'static str {
        match self {
            WorkflowStep::Description => "Project description",
            WorkflowStep::NeedsAnalysis => "Needs analysis",
            WorkflowStep::Planning => "Planning",
            WorkflowStep::Specifications => "Functional specifications",
            WorkflowStep::TestSheet => "Test sheet",
            WorkflowStep::Report => "Project report",
            WorkflowStep::NeedsExpression => "Needs expression",
            WorkflowStep::Logbook => "Logbook",
        }
    }

    pub fn is_student_step(self) -> bool {
        self.number() >= 4
    }

    /// Steps 7 and 8 extend the core six-step workflow.
    pub fn is_optional(self) -> bool {
        matches!(self, WorkflowStep::NeedsExpression | WorkflowStep::Logbook)
    }
}

impl From<WorkflowStep> for u8 {
    fn from(step: WorkflowStep) -> Self {
        step.number()
    }
}

impl TryFrom<u8> for WorkflowStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        WorkflowStep::from_number(value).ok_or_else(|| format!("unknown workflow step {value}"))
    }
}

impl FromStr for WorkflowStep {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let number = value
            .trim()
            .parse::<u8>()
            .map_err(|_| format!("invalid step number '{}'", value.trim()))?;
        WorkflowStep::try_from(number)
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.name())
    }
}

/// Supervisor-editable settings of one student step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfig {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_date: Option<NaiveDate>,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            submission_date: None,
            deadline_date: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// Set by the supervisor; never replaced by a projection.
    Explicit,
    /// Suggested from the milestone projection until the supervisor sets a date.
    Projected,
    Unset,
    Disabled,
}

impl DateSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DateSource::Explicit => "explicit",
            DateSource::Projected => "projected",
            DateSource::Unset => "unset",
            DateSource::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStep {
    pub step: WorkflowStep,
    pub name: String,
    pub enabled: bool,
    pub submission_date: Option<NaiveDate>,
    pub source: DateSource,
    pub deadline_date: Option<NaiveDate>,
}

/// Per-step configuration of the student steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSchedule {
    steps: BTreeMap<WorkflowStep, StepConfig>,
}

impl Default for StepSchedule {
    fn default() -> Self {
        let steps = WorkflowStep::STUDENT
            .into_iter()
            .map(|step| (step, StepConfig::default()))
            .collect();
        Self { steps }
    }
}

impl StepSchedule {
    pub fn config(&self, step: WorkflowStep) -> Option<&StepConfig> {
        self.steps.get(&step)
    }

    pub fn configs(&self) -> impl Iterator<Item = (WorkflowStep, &StepConfig)> {
        self.steps.iter().map(|(step, config)| (*step, config))
    }

    pub fn set_config(&mut self, step: WorkflowStep, config: StepConfig) -> Result<(), String> {
        Self::ensure_student_step(step)?;
        if let (Some(submission), Some(deadline)) = (config.submission_date, config.deadline_date)
        {
            if deadline < submission {
                return Err(format!(
                    "step {} deadline {deadline} is before its submission date {submission}",
                    step.number()
                ));
            }
        }
        self.steps.insert(step, config);
        Ok(())
    }

    pub fn set_enabled(&mut self, step: WorkflowStep, enabled: bool) -> Result<(), String> {
        let mut config = self.config(step).cloned().unwrap_or_default();
        config.enabled = enabled;
        self.set_config(step, config)
    }

    pub fn set_submission_date(
        &mut self,
        step: WorkflowStep,
        date: Option<NaiveDate>,
    ) -> Result<(), String> {
        let mut config = self.config(step).cloned().unwrap_or_default();
        config.submission_date = date;
        self.set_config(step, config)
    }

    pub fn set_deadline_date(
        &mut self,
        step: WorkflowStep,
        date: Option<NaiveDate>,
    ) -> Result<(), String> {
        let mut config = self.config(step).cloned().unwrap_or_default();
        config.deadline_date = date;
        self.set_config(step, config)
    }

    /// Effective dates per student step: an explicit date wins over the
    /// projected milestone, which is only a default.
    pub fn resolve(&self, milestones: Option<&Milestones>) -> Vec<ResolvedStep> {
        WorkflowStep::STUDENT
            .into_iter()
            .map(|step| {
                let config = self.config(step).cloned().unwrap_or_default();
                let projected = milestones.and_then(|m| m.get(step));
                let (submission_date, source) = if !config.enabled {
                    (None, DateSource::Disabled)
                } else if let Some(explicit) = config.submission_date {
                    (Some(explicit), DateSource::Explicit)
                } else if let Some(date) = projected {
                    (Some(date), DateSource::Projected)
                } else {
                    (None, DateSource::Unset)
                };
                ResolvedStep {
                    step,
                    name: step.name().to_string(),
                    enabled: config.enabled,
                    submission_date,
                    source,
                    deadline_date: config.enabled.then_some(config.deadline_date).flatten(),
                }
            })
            .collect()
    }

    pub fn enabled_step_count(&self) -> usize {
        let supervisor_steps = WorkflowStep::ALL
            .iter()
            .filter(|step| !step.is_student_step())
            .count();
        supervisor_steps
            + WorkflowStep::STUDENT
                .iter()
                .filter(|step| self.config(**step).is_none_or(|config| config.enabled))
                .count()
    }

    fn ensure_student_step(step: WorkflowStep) -> Result<(), String> {
        if step.is_student_step() {
            Ok(())
        } else {
            Err(format!(
                "step {} is configured by the supervisor and has no submission dates",
                step.number()
            ))
        }
    }
}
