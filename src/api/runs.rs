/// Run control REST API endpoints
///
/// Triggers runs over the current snapshot, resets the engine and reports its
/// status.

use super::{ApiError, AppState};
use crate::{runtime::EngineError, workflow::types::RunStatus};
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};

/// Result of a successful run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub run_id: String,
    pub status: RunStatus,
    pub order: Vec<String>,
    pub outputs: HashMap<String, Value>,
    pub skipped: Vec<String>,
}

/// Current engine state
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: RunStatus,
    pub outputs: HashMap<String, Value>,
    pub last_error: Option<String>,
}

/// Create run control routes
pub fn create_run_routes() -> Router<AppState> {
    Router::new()
        .route("/api/run", post(run_workflow))
        .route("/api/reset", post(reset_engine))
        .route("/api/status", get(get_status))
        .route("/api/node-types", get(list_node_types))
}

/// Run the current workflow snapshot
///
/// POST /api/run
/// Returns: { "runId", "status", "order", "outputs", "skipped" }
///
/// The run executes on its own task, so a client that disconnects does not
/// cancel it.
async fn run_workflow(State(state): State<AppState>) -> Result<Json<RunResponse>, ApiError> {
    let workflow = state.provider.snapshot();
    tracing::info!("📥 Run requested for workflow: {}", workflow.id);

    let engine = Arc::clone(&state.engine);
    let report = tokio::spawn(async move { engine.run(&workflow).await })
        .await
        .map_err(|e| {
            tracing::error!("❌ Run task failed: {}", e);
            EngineError::RunAborted
        })??;

    Ok(Json(RunResponse {
        run_id: report.run_id.clone(),
        status: state.engine.status(),
        skipped: report.skipped().into_iter().map(str::to_string).collect(),
        order: report.order,
        outputs: report.outputs,
    }))
}

/// Return the engine to IDLE
///
/// POST /api/reset
async fn reset_engine(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    state.engine.reset()?;
    Ok(Json(status_of(&state)))
}

/// GET /api/status
async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(status_of(&state))
}

/// GET /api/node-types
async fn list_node_types(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.engine.registry().types())
}

fn status_of(state: &AppState) -> StatusResponse {
    StatusResponse {
        status: state.engine.status(),
        outputs: state.engine.outputs(),
        last_error: state.engine.last_error(),
    }
}
