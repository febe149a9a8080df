/// promptLLMNode: single-turn chat completion against an OpenAI-compatible API

use crate::config::NodesConfig;
use crate::runtime::executor::NodeComputation;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use serde_json::{json, Map, Value};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Prompt computation bound to one endpoint and model
#[derive(Debug, Clone)]
pub struct PromptLlm {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl PromptLlm {
    pub fn new(config: &NodesConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.llm_api_url.clone(),
            model: config.llm_model.clone(),
            api_key: config.llm_api_key.clone(),
        }
    }

    async fn prompt(&self, inputs: Map<String, Value>) -> Result<Value> {
        let api_key = self
            .api_key
            .as_deref()
            .context("promptLLMNode requires an API key (GATEFLOW_LLM_API_KEY)")?;

        let query = super::text_of(inputs.get("query"));
        let system_prompt = inputs
            .get("systemPrompt")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": query },
            ],
            "max_tokens": 150,
            "temperature": 0.7,
        });

        tracing::debug!("🤖 Prompting {} at {}", self.model, self.api_url);
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("LLM request failed: {}", e))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read LLM response: {}", e))?;

        if !status.is_success() {
            let message = payload
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            anyhow::bail!("Error: {} - {}", status.as_u16(), message);
        }

        payload
            .pointer("/choices/0/message/content")
            .cloned()
            .context("LLM response has no choices[0].message.content")
    }
}

impl NodeComputation for PromptLlm {
    fn compute(&self, inputs: Map<String, Value>) -> BoxFuture<'_, Result<Value>> {
        Box::pin(self.prompt(inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};

    /// Serve a canned completions endpoint on an ephemeral port
    async fn fake_endpoint(status: StatusCode, reply: Value) -> String {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(request): Json<Value>| {
                let reply = reply.clone();
                async move {
                    assert_eq!(request["messages"][1]["role"], "user");
                    (status, Json(reply))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    fn node(api_url: String, api_key: Option<&str>) -> PromptLlm {
        PromptLlm::new(&NodesConfig {
            llm_api_url: api_url,
            llm_model: "test-model".into(),
            llm_api_key: api_key.map(str::to_string),
        })
    }

    fn query(q: &str) -> Map<String, Value> {
        json!({ "query": q }).as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn missing_key_is_an_error() {
        let err = node("http://127.0.0.1:9/".into(), None)
            .compute(query("hi"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let url = fake_endpoint(
            StatusCode::OK,
            json!({ "choices": [{ "message": { "role": "assistant", "content": "pong" } }] }),
        )
        .await;

        let output = node(url, Some("k")).compute(query("ping")).await.unwrap();
        assert_eq!(output, json!("pong"));
    }

    #[tokio::test]
    async fn api_errors_surface_message() {
        let url = fake_endpoint(
            StatusCode::UNAUTHORIZED,
            json!({ "error": { "message": "bad key" } }),
        )
        .await;

        let err = node(url, Some("k")).compute(query("ping")).await.unwrap_err();
        assert_eq!(err.to_string(), "Error: 401 - bad key");
    }
}
