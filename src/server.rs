/// Server setup and initialization
///
/// Wires together all components: graph provider, node registry, execution
/// engine, event forwarding and HTTP routes.

use crate::{
    api::{create_api_routes, AppState},
    config::Config,
    runtime::{ChannelObserver, ExecutionEngine, ExecutionEvent, NodeRegistry},
    workflow::GraphProvider,
};
use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Create the main Axum application with all routes
///
/// Builds the built-in node registry from configuration, starts the task that
/// forwards engine events to the log, and mounts the API.
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("⚙️ Initializing built-in node registry");
    let registry = NodeRegistry::with_builtins(&config.nodes);

    tracing::info!("📡 Starting execution event forwarder");
    let (observer, mut events) = ChannelObserver::channel();
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_event(&event);
        }
    });

    tracing::info!("🚀 Initializing execution engine");
    let engine = Arc::new(ExecutionEngine::new(registry, Arc::new(observer), &config.engine));

    let state = AppState {
        provider: Arc::new(GraphProvider::default()),
        engine,
    };

    let app = create_router(state);
    tracing::info!("✅ Application initialized successfully");

    Ok(app)
}

/// Mount health check and API routes over existing state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Workflow, run and status API routes
        .merge(create_api_routes().with_state(state))
}

/// Start the HTTP server with the given configuration
///
/// Creates the application and starts the Axum server on the configured address and port.
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting Gateflow server...");

    let app = create_app(config.clone()).await?;

    // Bind to the configured address
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn log_event(event: &ExecutionEvent) {
    match event {
        ExecutionEvent::StatusChanged { status } => tracing::info!("📊 Engine status: {:?}", status),
        ExecutionEvent::NodeStarted { run_id, node_id } => {
            tracing::debug!("▶️ [{}] '{}' started", run_id, node_id)
        }
        ExecutionEvent::NodeOutput { run_id, node_id, output } => tracing::debug!(
            "📤 [{}] '{}' output: {}",
            run_id,
            node_id,
            serde_json::to_string(output).unwrap_or_else(|_| "invalid_json".to_string())
        ),
        ExecutionEvent::NodeSkipped { run_id, node_id } => {
            tracing::debug!("⏭️ [{}] '{}' skipped", run_id, node_id)
        }
    }
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
