use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::{
    Milestones, PersistenceError, PlanError, PlanReport, PlanStore, PlanningInput, ProjectPlan,
    ProjectionError, ResolvedStep, StepConfig, StepSchedule, TimelineProjection, VacationCalendar,
    VacationSource, WorkflowStep,
};

type SharedSource = Arc<dyn VacationSource + Send + Sync>;
type SharedStore = Arc<dyn PlanStore + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    plan: Arc<RwLock<ProjectPlan>>,
    vacations: SharedSource,
    store: Option<SharedStore>,
    plan_id: i64,
}

impl AppState {
    pub fn new(plan: ProjectPlan) -> Self {
        Self {
            plan: Arc::new(RwLock::new(plan)),
            vacations: Arc::new(VacationCalendar::new()),
            store: None,
            plan_id: 1,
        }
    }

    pub fn with_vacations(mut self, vacations: SharedSource) -> Self {
        self.vacations = vacations;
        self
    }

    /// Mutations are written through to `store` under `plan_id`.
    pub fn with_store(mut self, store: SharedStore, plan_id: i64) -> Self {
        self.store = Some(store);
        self.plan_id = plan_id;
        self
    }

    fn plan(&self) -> Arc<RwLock<ProjectPlan>> {
        self.plan.clone()
    }

    fn persist(&self, plan: &ProjectPlan) -> Result<(), ApiError> {
        if let Some(store) = &self.store {
            store.save_plan(self.plan_id, plan)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    InvalidRange(String),
    Invalid(String),
    Upstream(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<ProjectionError> for ApiError {
    fn from(value: ProjectionError) -> Self {
        match value {
            ProjectionError::InvalidRange { .. } => ApiError::InvalidRange(value.to_string()),
            ProjectionError::MissingDate(_) => ApiError::Invalid(value.to_string()),
        }
    }
}

impl From<PlanError> for ApiError {
    fn from(value: PlanError) -> Self {
        match value {
            PlanError::Projection(err) => err.into(),
            PlanError::Vacation(err) => ApiError::Upstream(err.to_string()),
            PlanError::Table(err) => ApiError::Internal(err.to_string()),
            PlanError::Invalid(message) => ApiError::Invalid(message),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::InvalidData(message) => ApiError::Invalid(message),
            other => {
                error!(error = %other, "failed to persist plan");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::InvalidRange(message) => (StatusCode::BAD_REQUEST, "invalid_range", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Upstream(message) => (StatusCode::BAD_GATEWAY, "vacation_source", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

/// Stateless projection returned to client-side renderers.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectionResponse {
    pub projection: TimelineProjection,
    pub milestones: Option<Milestones>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/planning", get(get_planning).put(update_planning))
        .route("/projection", get(get_projection).post(project_input))
        .route("/steps", get(list_steps))
        .route("/steps/:step", get(get_step).put(update_step))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "project timeline HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_planning(State(state): State<AppState>) -> Json<PlanningInput> {
    let plan = state.plan();
    let planning = {
        let guard = plan.read();
        guard.planning().clone()
    };
    Json(planning)
}

async fn update_planning(
    State(state): State<AppState>,
    Json(planning): Json<PlanningInput>,
) -> Result<Json<PlanningInput>, ApiError> {
    let plan = state.plan();
    let current = {
        let mut guard = plan.write();
        let mut candidate = guard.clone();
        candidate.set_planning(planning)?;
        state.persist(&candidate)?;
        *guard = candidate;
        guard.planning().clone()
    };
    Ok(Json(current))
}

/// Runs the report off the async executor: the vacation source may block on I/O.
async fn build_report(state: &AppState, plan: ProjectPlan) -> Result<PlanReport, ApiError> {
    let source = state.vacations.clone();
    tokio::task::spawn_blocking(move || plan.report(source.as_ref()))
        .await
        .map_err(|err| ApiError::internal(format!("projection task failed: {err}")))?
        .map_err(ApiError::from)
}

async fn get_projection(State(state): State<AppState>) -> Result<Json<PlanReport>, ApiError> {
    let plan = state.plan().read().clone();
    let report = build_report(&state, plan).await?;
    Ok(Json(report))
}

async fn project_input(
    State(state): State<AppState>,
    Json(planning): Json<PlanningInput>,
) -> Result<Json<ProjectionResponse>, ApiError> {
    let plan = ProjectPlan::from_parts(planning, StepSchedule::default())?;
    let report = build_report(&state, plan).await?;
    Ok(Json(ProjectionResponse {
        projection: report.projection,
        milestones: report.milestones,
        notice: report.notice,
    }))
}

async fn list_steps(State(state): State<AppState>) -> Result<Json<Vec<ResolvedStep>>, ApiError> {
    let steps = {
        let plan = state.plan();
        let guard = plan.read();
        guard.resolved_steps()?
    };
    Ok(Json(steps))
}

fn parse_step(raw: u8) -> Result<WorkflowStep, ApiError> {
    let step = WorkflowStep::try_from(raw).map_err(ApiError::not_found)?;
    if !step.is_student_step() {
        return Err(ApiError::not_found(format!(
            "step {raw} has no configurable dates"
        )));
    }
    Ok(step)
}

async fn get_step(
    State(state): State<AppState>,
    Path(raw_step): Path<u8>,
) -> Result<Json<StepConfig>, ApiError> {
    let step = parse_step(raw_step)?;
    let config = {
        let plan = state.plan();
        let guard = plan.read();
        guard.steps().config(step).cloned().unwrap_or_default()
    };
    Ok(Json(config))
}

async fn update_step(
    State(state): State<AppState>,
    Path(raw_step): Path<u8>,
    Json(config): Json<StepConfig>,
) -> Result<Json<StepConfig>, ApiError> {
    let step = parse_step(raw_step)?;
    let plan = state.plan();
    let updated = {
        let mut guard = plan.write();
        let mut candidate = guard.clone();
        candidate.set_step_config(step, config)?;
        state.persist(&candidate)?;
        *guard = candidate;
        guard
            .steps()
            .config(step)
            .cloned()
            .ok_or_else(|| ApiError::internal("step missing after update"))?
    };
    Ok(Json(updated))
}
