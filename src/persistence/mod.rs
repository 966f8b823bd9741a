use crate::plan::{PlanError, ProjectPlan};
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("sqlite error: {0}")]
    Sqlite(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Storage for project plans, keyed by the activity instance that owns them.
pub trait PlanStore {
    fn save_plan(&self, plan_id: i64, plan: &ProjectPlan) -> PersistenceResult<()>;
    fn load_plan(&self, plan_id: i64) -> PersistenceResult<Option<ProjectPlan>>;
    fn delete_plan(&self, plan_id: i64) -> PersistenceResult<bool>;
}

pub fn validate_plan(plan: &ProjectPlan) -> PersistenceResult<()> {
    plan.validate()
        .map_err(|err: PlanError| PersistenceError::InvalidData(err.to_string()))
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    JsonPlanStore, export_steps_to_csv, load_plan_from_json, save_plan_to_json, write_steps_csv,
};
