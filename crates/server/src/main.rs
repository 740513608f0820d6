use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use shared::{
    error::ErrorBody,
    protocol::{RunPredictionResponse, DATA_PATH, REALTIME_PATH, RUN_PREDICTION_PATH},
};
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;
mod predictor;
mod records;

use api::ApiContext;
use app_state::AppState;
use config::load_settings;
use records::Row;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(
        frontend = %settings.frontend_dir.display(),
        predictions = %settings.prediction_csv_path.display(),
        "settings loaded"
    );

    let state = AppState {
        api: ApiContext::new(settings),
    };
    let app = build_router(Arc::new(state));

    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let frontend = ServeDir::new(&state.api.settings.frontend_dir);
    Router::new()
        .route("/healthz", get(healthz))
        .route(RUN_PREDICTION_PATH, get(http_run_prediction))
        .route(REALTIME_PATH, get(http_realtime))
        .route(DATA_PATH, get(http_traffic_data))
        .fallback_service(frontend)
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_run_prediction(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RunPredictionResponse>, (StatusCode, Json<ErrorBody>)> {
    api::run_prediction(&state.api)
        .await
        .map(Json)
        .map_err(|(status, body)| (status, Json(body)))
}

async fn http_realtime(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Row>>, (StatusCode, Json<Vec<ErrorBody>>)> {
    api::latest_prediction(&state.api)
        .await
        .map(Json)
        .map_err(|(status, body)| (status, Json(body)))
}

async fn http_traffic_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Row>>, (StatusCode, Json<ErrorBody>)> {
    api::traffic_data(&state.api)
        .await
        .map(Json)
        .map_err(|(status, body)| (status, Json(body)))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
