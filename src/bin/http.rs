#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use project_timeline::{AppConfig, PlanStore, ProjectPlan, http_api};
    use tracing::info;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = AppConfig::load()?;
    let addr: SocketAddr = config.server.bind_address().parse()?;
    let vacations = config.vacations.build_source()?;

    let state = match &config.storage.sqlite_path {
        #[cfg(feature = "sqlite")]
        Some(path) => {
            let store = project_timeline::SqlitePlanStore::new(path)?;
            let plan = store.load_plan(config.server.plan_id)?.unwrap_or_default();
            info!(path = %path.display(), plan_id = config.server.plan_id, "plan store opened");
            http_api::AppState::new(plan).with_store(Arc::new(store), config.server.plan_id)
        }
        #[cfg(not(feature = "sqlite"))]
        Some(_) => {
            return Err("storage.sqlite_path requires the `sqlite` feature".into());
        }
        None => http_api::AppState::new(ProjectPlan::new()),
    };
    let state = state.with_vacations(vacations);

    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
