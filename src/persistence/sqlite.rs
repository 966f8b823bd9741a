use super::{PersistenceError, PersistenceResult, PlanStore};
use crate::plan::ProjectPlan;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;
use tracing::info;

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value.to_string())
    }
}

pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS plans (
                id INTEGER PRIMARY KEY,
                planning_json TEXT NOT NULL,
                steps_json TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<std::sync::MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::Sqlite("sqlite mutex poisoned".into()))
    }
}

impl PlanStore for SqlitePlanStore {
    fn save_plan(&self, plan_id: i64, plan: &ProjectPlan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let planning_json = serde_json::to_string(plan.planning())?;
        let steps_json = serde_json::to_string(plan.steps())?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO plans (id, planning_json, steps_json, updated_at)
             VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP)
             ON CONFLICT(id) DO UPDATE SET
                planning_json = excluded.planning_json,
                steps_json = excluded.steps_json,
                updated_at = CURRENT_TIMESTAMP",
            params![plan_id, planning_json, steps_json],
        )?;
        tx.commit()?;
        info!(plan_id, "plan saved to sqlite");
        Ok(())
    }

    fn load_plan(&self, plan_id: i64) -> PersistenceResult<Option<ProjectPlan>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT planning_json, steps_json FROM plans WHERE id = ?1")?;
        let row: Option<(String, String)> = stmt
            .query_row(params![plan_id], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let Some((planning_json, steps_json)) = row else {
            return Ok(None);
        };

        let planning = serde_json::from_str(&planning_json)?;
        let steps = serde_json::from_str(&steps_json)?;
        let plan = ProjectPlan::from_parts(planning, steps)
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
        super::validate_plan(&plan)?;
        Ok(Some(plan))
    }

    fn delete_plan(&self, plan_id: i64) -> PersistenceResult<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM plans WHERE id = ?1", params![plan_id])?;
        Ok(removed > 0)
    }
}
