/// Gateflow: graph execution engine for visual node workflows
///
/// Main entry point for the Gateflow server. Loads configuration and starts
/// the HTTP server with workflow and run control endpoints.

use gateflow::{config::Config, server::start_server};

/// Application entry point
///
/// The server provides:
/// - Workflow snapshot API at /api/workflow
/// - Run control at /api/run, /api/reset, /api/status
/// - Health check at /healthz
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Defaults to 0.0.0.0:3004, overridable through GATEFLOW_* variables
    let config = Config::from_env();

    start_server(config).await?;

    Ok(())
}
