/// Configuration management for the Gateflow engine
///
/// Handles server binding, engine limits and the settings of built-in nodes
/// that reach external services.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Engine configuration
    pub engine: EngineConfig,
    /// Built-in node configuration
    pub nodes: NodesConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Execution engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-node computation limit in milliseconds; unset waits indefinitely
    pub node_timeout_ms: Option<u64>,
}

impl EngineConfig {
    pub fn node_timeout(&self) -> Option<Duration> {
        self.node_timeout_ms.map(Duration::from_millis)
    }
}

/// Settings for built-in nodes that call out of process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodesConfig {
    /// OpenAI-compatible chat completions endpoint
    pub llm_api_url: String,
    /// Model name sent with every prompt
    pub llm_model: String,
    /// Bearer token; prompt nodes fail when unset
    #[serde(skip_serializing)]
    pub llm_api_key: Option<String>,
}

impl Default for ServerConfig {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            host: std::env::var("GATEFLOW_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("GATEFLOW_PORT")
                .unwrap_or_else(|_| "3004".to_string())
                .parse()
                .unwrap_or(3004),
        }
    }
}

impl Default for NodesConfig {
    fn default() -> Self {
        Self {
            llm_api_url: std::env::var("GATEFLOW_LLM_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            llm_model: std::env::var("GATEFLOW_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            llm_api_key: std::env::var("GATEFLOW_LLM_API_KEY").ok().filter(|key| !key.is_empty()),
        }
    }
}

impl Config {
    /// Defaults plus `GATEFLOW_NODE_TIMEOUT_MS`
    pub fn from_env() -> Self {
        Self {
            engine: EngineConfig {
                node_timeout_ms: std::env::var("GATEFLOW_NODE_TIMEOUT_MS")
                    .ok()
                    .and_then(|ms| ms.parse().ok()),
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_off_by_default() {
        assert_eq!(EngineConfig::default().node_timeout(), None);
        let config = EngineConfig {
            node_timeout_ms: Some(250),
        };
        assert_eq!(config.node_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn api_key_is_not_serialized() {
        let nodes = NodesConfig {
            llm_api_url: "http://localhost/v1/chat/completions".into(),
            llm_model: "test".into(),
            llm_api_key: Some("secret".into()),
        };
        let value = serde_json::to_value(&nodes).unwrap();
        assert!(value.get("llm_api_key").is_none());
        assert_eq!(value["llm_model"], "test");
    }
}
