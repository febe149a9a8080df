/// HTTP API Layer
///
/// This module exposes the engine over REST. It handles:
/// - Reading and replacing the current workflow snapshot
/// - Triggering runs and resetting the engine
/// - Reporting status, outputs and registered node types

use crate::{
    runtime::{EngineError, ExecutionEngine},
    workflow::GraphProvider,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Router,
};
use serde_json::json;
use std::sync::Arc;

// Workflow snapshot endpoints (GET/PUT)
pub mod workflows;

// Run, reset, status and node-type endpoints
pub mod runs;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Holder of the editor's current graph
    pub provider: Arc<GraphProvider>,
    /// The single execution engine
    pub engine: Arc<ExecutionEngine>,
}

/// Create all API routes
pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .merge(workflows::create_workflow_routes())
        .merge(runs::create_run_routes())
}

/// Engine error rendered as a JSON response
///
/// Body: `{ "error", "kind", "nodeId"?, "cycle"? }`
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        Self(error)
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            EngineError::RunInProgress => StatusCode::CONFLICT,
            e if e.is_graph_error() => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        });
        if let Some(node_id) = self.0.node_id() {
            body["nodeId"] = json!(node_id);
        }
        if let EngineError::CycleDetected { cycle } = &self.0 {
            body["cycle"] = json!(cycle);
        }

        (self.status_code(), Json(body)).into_response()
    }
}
