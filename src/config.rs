use crate::vacation::{
    DATASET_RECORDS_ENDPOINT, VacationCalendar, VacationError, VacationSource,
    load_vacations_from_csv,
};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub const CONFIG_PATH_ENV: &str = "PROJECT_TIMELINE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "project-timeline.toml";
const ENV_PREFIX: &str = "PROJECT_TIMELINE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub vacations: VacationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Activity instance whose plan the server edits.
    pub plan_id: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            plan_id: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub sqlite_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VacationConfig {
    /// Official calendar CSV export loaded at startup.
    pub dataset_path: Option<PathBuf>,
    /// Query the public records API instead (needs the `remote_calendar` feature).
    pub remote: bool,
    pub endpoint: String,
}

impl Default for VacationConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            remote: false,
            endpoint: DATASET_RECORDS_ENDPOINT.to_string(),
        }
    }
}

impl VacationConfig {
    pub fn build_source(&self) -> Result<Arc<dyn VacationSource + Send + Sync>, VacationError> {
        if self.remote {
            return remote_source(&self.endpoint);
        }
        let calendar = match &self.dataset_path {
            Some(path) => {
                let calendar = load_vacations_from_csv(path)?;
                info!(path = %path.display(), periods = calendar.len(), "vacation dataset loaded");
                calendar
            }
            None => VacationCalendar::new(),
        };
        Ok(Arc::new(calendar))
    }
}

#[cfg(feature = "remote_calendar")]
fn remote_source(endpoint: &str) -> Result<Arc<dyn VacationSource + Send + Sync>, VacationError> {
    info!(endpoint, "using remote vacation calendar");
    Ok(Arc::new(crate::vacation::RemoteVacationSource::new(endpoint)))
}

#[cfg(not(feature = "remote_calendar"))]
fn remote_source(_endpoint: &str) -> Result<Arc<dyn VacationSource + Send + Sync>, VacationError> {
    Err(VacationError::InvalidData(
        "remote vacation calendar requires the `remote_calendar` feature".into(),
    ))
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// File from `PROJECT_TIMELINE_CONFIG` (or `project-timeline.toml`, if present),
    /// then `PROJECT_TIMELINE__SECTION__KEY` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(path)
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
