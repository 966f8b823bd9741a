pub mod config;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod milestones;
pub mod persistence;
pub mod plan;
pub mod planning;
pub mod projection;
pub mod steps;
pub mod vacation;
pub mod weekly;

pub use config::AppConfig;
pub use milestones::{Milestone, Milestones, compute_milestones};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlanStore;
pub use persistence::{
    JsonPlanStore, PersistenceError, PlanStore, export_steps_to_csv, load_plan_from_json,
    save_plan_to_json, validate_plan, write_steps_csv,
};
pub use plan::{PlanError, PlanReport, PlanSummary, ProjectPlan};
pub use planning::{MAX_TASK_HOURS, PlanningInput, PlanningTask, TASK_COUNT};
pub use projection::{
    HOURS_PER_WEEK, MissingDate, ProjectionError, TaskAllocation, TimelineProjection,
    VacationOverlay, compute_projection,
};
pub use steps::{DateSource, ResolvedStep, StepConfig, StepSchedule, WorkflowStep};
pub use vacation::{
    VacationCalendar, VacationError, VacationPeriod, VacationSource, VacationZone,
    load_vacations_from_csv, read_vacations_csv,
};
pub use weekly::{TimelineTableError, weekly_timeline};
