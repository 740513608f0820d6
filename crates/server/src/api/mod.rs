use std::sync::Arc;

use axum::http::StatusCode;
use shared::{domain::CongestionLevel, error::ErrorBody, protocol::RunPredictionResponse};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    config::Settings,
    predictor::run_predictor,
    records::{latest_row, load_rows, RecordsError, Row},
};

pub type ApiFailure<E> = (StatusCode, E);

#[derive(Clone)]
pub struct ApiContext {
    pub settings: Arc<Settings>,
    /// Serializes predictor runs; each run appends to the prediction CSV.
    predictor_lock: Arc<Mutex<()>>,
}

impl ApiContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            predictor_lock: Arc::new(Mutex::new(())),
        }
    }
}

pub async fn run_prediction(
    ctx: &ApiContext,
) -> Result<RunPredictionResponse, ApiFailure<ErrorBody>> {
    let _running = ctx.predictor_lock.lock().await;
    info!(program = %ctx.settings.predictor_program, "running prediction");

    let run = run_predictor(&ctx.settings.predictor_program, &ctx.settings.predictor_args)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to start predictor");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(format!("Server error: {e}")),
            )
        })?;
    debug!(stdout = %run.stdout, stderr = %run.stderr, "predictor output");

    if !run.success {
        warn!(exit_code = ?run.exit_code, "predictor exited with failure");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::with_stderr("Prediction script failed", run.stderr),
        ));
    }

    Ok(RunPredictionResponse {
        message: "Prediction run completed".to_string(),
        stdout: run.stdout,
    })
}

/// Newest prediction row as a one-element list (empty when the file has no
/// rows). Errors are also lists so clients can always index the first item.
pub async fn latest_prediction(ctx: &ApiContext) -> Result<Vec<Row>, ApiFailure<Vec<ErrorBody>>> {
    match latest_row(&ctx.settings.prediction_csv_path).await {
        Ok(row) => {
            if let Some(row) = &row {
                if let Some((labelled, from_flow)) = level_mismatch(row) {
                    warn!(?labelled, ?from_flow, "congestion label disagrees with predicted flow");
                } else {
                    debug!(level = ?row.get("congestion_level"), "serving latest prediction");
                }
            }
            Ok(row.into_iter().collect())
        }
        Err(e) => Err((status_for(&e), vec![ErrorBody::new(e.to_string())])),
    }
}

pub async fn traffic_data(ctx: &ApiContext) -> Result<Vec<Row>, ApiFailure<ErrorBody>> {
    load_rows(&ctx.settings.data_csv_path)
        .await
        .map_err(|e| (status_for(&e), ErrorBody::new(e.to_string())))
}

/// Levels from the row's label and from its predicted flow, when both are
/// known and differ. The row is served either way.
fn level_mismatch(row: &Row) -> Option<(CongestionLevel, CongestionLevel)> {
    let labelled = CongestionLevel::from_label(row.get("congestion_level")?.as_str()?);
    let from_flow = CongestionLevel::from_flow(row.get("flow_weighted_pred")?.as_f64()?);
    let known = labelled != CongestionLevel::Unknown && from_flow != CongestionLevel::Unknown;
    (known && labelled != from_flow).then_some((labelled, from_flow))
}

fn status_for(err: &RecordsError) -> StatusCode {
    match err {
        RecordsError::NotFound(_) => StatusCode::NOT_FOUND,
        RecordsError::Io { .. } | RecordsError::Csv(_) => {
            error!(error = %err, "failed to read records");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
