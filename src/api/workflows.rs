/// Workflow snapshot REST API endpoints
///
/// The editor reads the current graph and replaces it wholesale. A run in
/// progress keeps the snapshot it started with.

use super::{ApiError, AppState};
use crate::{runtime::EngineError, workflow::types::{RunStatus, Workflow}};
use axum::{
    extract::State,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;

/// Response for workflow update operations
#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    pub id: String,
    pub message: String,
}

/// Create workflow snapshot routes
pub fn create_workflow_routes() -> Router<AppState> {
    Router::new().route("/api/workflow", get(get_workflow).put(update_workflow))
}

/// Get the current workflow snapshot
///
/// GET /api/workflow
/// Returns: { "id": "...", "name": "...", "nodes": [...], "edges": [...] }
async fn get_workflow(State(state): State<AppState>) -> Json<Workflow> {
    Json(Workflow::clone(&state.provider.snapshot()))
}

/// Replace the current workflow snapshot
///
/// PUT /api/workflow
/// Body: { "id": "...", "name": "...", "nodes": [...], "edges": [...] }
/// Refused with 409 while a run is processing.
async fn update_workflow(
    State(state): State<AppState>,
    Json(workflow): Json<Workflow>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    if state.engine.status() == RunStatus::Processing {
        tracing::warn!("⏸️ Rejected workflow update for '{}' during a run", workflow.id);
        return Err(EngineError::RunInProgress.into());
    }

    tracing::info!(
        "🔥 Stored workflow: {} ({}) with {} nodes",
        workflow.id,
        workflow.name,
        workflow.nodes.len()
    );

    let response = WorkflowResponse {
        id: workflow.id.clone(),
        message: format!("Workflow '{}' stored", workflow.name),
    };
    state.provider.store(workflow);

    Ok(Json(response))
}
