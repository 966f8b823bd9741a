use super::{PersistenceError, PersistenceResult, PlanStore};
use crate::plan::ProjectPlan;
use crate::steps::ResolvedStep;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct PlanSnapshot {
    #[serde(default = "default_version")]
    version: u32,
    plan: ProjectPlan,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl PlanSnapshot {
    fn from_plan(plan: &ProjectPlan) -> PersistenceResult<Self> {
        super::validate_plan(plan)?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            plan: plan.clone(),
        })
    }

    fn into_plan(self) -> PersistenceResult<ProjectPlan> {
        if self.version > SNAPSHOT_VERSION {
            return Err(PersistenceError::InvalidData(format!(
                "unsupported plan snapshot version {}",
                self.version
            )));
        }
        super::validate_plan(&self.plan)?;
        Ok(self.plan)
    }
}

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &ProjectPlan, path: P) -> PersistenceResult<()> {
    let snapshot = PlanSnapshot::from_plan(plan)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectPlan> {
    let file = File::open(path)?;
    let snapshot: PlanSnapshot = serde_json::from_reader(file)?;
    snapshot.into_plan()
}

/// One JSON snapshot per plan inside a directory.
pub struct JsonPlanStore {
    dir: PathBuf,
}

impl JsonPlanStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> PersistenceResult<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    fn path_for(&self, plan_id: i64) -> PathBuf {
        self.dir.join(format!("plan-{plan_id}.json"))
    }
}

impl PlanStore for JsonPlanStore {
    fn save_plan(&self, plan_id: i64, plan: &ProjectPlan) -> PersistenceResult<()> {
        let path = self.path_for(plan_id);
        save_plan_to_json(plan, &path)?;
        info!(plan_id, path = %path.display(), "plan saved");
        Ok(())
    }

    fn load_plan(&self, plan_id: i64) -> PersistenceResult<Option<ProjectPlan>> {
        match load_plan_from_json(self.path_for(plan_id)) {
            Ok(plan) => Ok(Some(plan)),
            Err(PersistenceError::Io(err)) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn delete_plan(&self, plan_id: i64) -> PersistenceResult<bool> {
        match fs::remove_file(self.path_for(plan_id)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Serialize)]
struct StepCsvRecord {
    step: u8,
    name: String,
    enabled: bool,
    submission_date: String,
    source: &'static str,
    deadline_date: String,
}

impl From<&ResolvedStep> for StepCsvRecord {
    fn from(resolved: &ResolvedStep) -> Self {
        Self {
            step: resolved.step.number(),
            name: resolved.name.clone(),
            enabled: resolved.enabled,
            submission_date: format_date(resolved.submission_date),
            source: resolved.source.as_str(),
            deadline_date: format_date(resolved.deadline_date),
        }
    }
}

/// Resolved step dates as CSV, one row per student step.
pub fn write_steps_csv<W: Write>(plan: &ProjectPlan, writer: W) -> PersistenceResult<()> {
    let resolved = plan
        .resolved_steps()
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    let mut writer = csv::Writer::from_writer(writer);
    for step in &resolved {
        writer.serialize(StepCsvRecord::from(step))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_steps_to_csv<P: AsRef<Path>>(plan: &ProjectPlan, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    write_steps_csv(plan, file)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
