//! HTTP surface driven through the router without a socket

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use gateflow::{
    api::AppState,
    config::{EngineConfig, NodesConfig},
    runtime::NoopObserver,
    server::create_router,
    ExecutionEngine, GraphProvider, NodeRegistry,
};
use serde_json::{json, Map, Value};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

fn builtins() -> NodeRegistry {
    NodeRegistry::with_builtins(&NodesConfig {
        llm_api_url: "http://127.0.0.1:9/v1/chat/completions".into(),
        llm_model: "test-model".into(),
        llm_api_key: None,
    })
}

fn app() -> Router {
    app_with(builtins())
}

fn app_with(registry: NodeRegistry) -> Router {
    let engine = ExecutionEngine::new(registry, Arc::new(NoopObserver), &EngineConfig::default());
    create_router(AppState {
        provider: Arc::new(GraphProvider::default()),
        engine: Arc::new(engine),
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

fn gated_workflow() -> Value {
    json!({
        "id": "wf-api",
        "name": "api demo",
        "nodes": [
            { "id": "g", "type": "ruleGateNode", "data": { "isEnabled": false } },
            { "id": "x", "type": "dataNode", "data": { "value": 1 }, "parentId": "g" },
            { "id": "s", "type": "dataNode", "data": { "value": "kept" } }
        ],
        "edges": []
    })
}

#[tokio::test]
async fn health_check() {
    let (status, body) = send(&app(), Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn stores_and_runs_workflow() {
    let app = app();

    let (status, _) = send(&app, Method::PUT, "/api/workflow", Some(gated_workflow())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, stored) = send(&app, Method::GET, "/api/workflow", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["id"], "wf-api");
    assert_eq!(stored["nodes"][1]["parentId"], "g");

    let (status, run) = send(&app, Method::POST, "/api/run", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["status"], "DONE");
    assert_eq!(run["outputs"]["s"], "kept");
    assert_eq!(run["outputs"]["g"], false);
    assert!(run["outputs"].get("x").is_none());
    assert_eq!(run["skipped"], json!(["x"]));
    assert!(run["runId"].as_str().is_some_and(|id| !id.is_empty()));

    let (_, status_body) = send(&app, Method::GET, "/api/status", None).await;
    assert_eq!(status_body["status"], "DONE");
    assert_eq!(status_body["outputs"]["s"], "kept");
    assert_eq!(status_body["lastError"], Value::Null);
}

#[tokio::test]
async fn graph_errors_are_unprocessable() {
    let app = app();
    let cyclic = json!({
        "id": "wf-cycle",
        "name": "cycle",
        "nodes": [
            { "id": "A", "type": "notesNode", "data": {} },
            { "id": "B", "type": "notesNode", "data": {} }
        ],
        "edges": [
            { "id": "e1", "source": "A", "target": "B", "targetHandle": "input" },
            { "id": "e2", "source": "B", "target": "A", "targetHandle": "input" }
        ]
    });
    send(&app, Method::PUT, "/api/workflow", Some(cyclic)).await;

    let (status, body) = send(&app, Method::POST, "/api/run", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "cycle_detected");
    assert_eq!(body["cycle"].as_array().map(Vec::len), Some(2));

    let (_, status_body) = send(&app, Method::GET, "/api/status", None).await;
    assert_eq!(status_body["status"], "ERROR");
    assert!(status_body["lastError"].as_str().unwrap().contains("cycle"));
}

#[tokio::test]
async fn computation_errors_name_the_node() {
    let app = app();
    let failing = json!({
        "id": "wf-fail",
        "name": "fail",
        "nodes": [
            { "id": "math", "type": "sumDiffNode", "data": { "number1": "x", "number2": "1" } }
        ],
        "edges": []
    });
    send(&app, Method::PUT, "/api/workflow", Some(failing)).await;

    let (status, body) = send(&app, Method::POST, "/api/run", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "node_computation");
    assert_eq!(body["nodeId"], "math");
}

#[tokio::test]
async fn unknown_node_type_is_rejected() {
    let app = app();
    let unknown = json!({
        "id": "wf-unknown",
        "nodes": [{ "id": "n", "type": "colorInputNode", "data": {} }]
    });
    send(&app, Method::PUT, "/api/workflow", Some(unknown)).await;

    let (status, body) = send(&app, Method::POST, "/api/run", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "unknown_node_type");
    assert_eq!(body["nodeId"], "n");
}

#[tokio::test]
async fn reset_clears_outputs() {
    let app = app();
    send(&app, Method::PUT, "/api/workflow", Some(gated_workflow())).await;
    send(&app, Method::POST, "/api/run", None).await;

    let (status, body) = send(&app, Method::POST, "/api/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "IDLE");
    assert_eq!(body["outputs"], json!({}));
}

#[tokio::test]
async fn lists_node_types() {
    let (status, body) = send(&app(), Method::GET, "/api/node-types", None).await;
    assert_eq!(status, StatusCode::OK);
    let types = body.as_array().unwrap();
    assert!(types.contains(&json!("ruleGateNode")));
    assert!(types.contains(&json!("promptLLMNode")));
}

#[tokio::test]
async fn run_survives_dropped_request() {
    let mut registry = builtins();
    registry.register("slowNode", |_inputs: Map<String, Value>| async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok::<_, anyhow::Error>(json!("finished"))
    });
    let app = app_with(registry);

    let slow = json!({
        "id": "wf-slow",
        "nodes": [{ "id": "slow", "type": "slowNode", "data": {} }]
    });
    send(&app, Method::PUT, "/api/workflow", Some(slow)).await;

    let dropped = tokio::time::timeout(Duration::from_millis(20), send(&app, Method::POST, "/api/run", None)).await;
    assert!(dropped.is_err());

    tokio::time::sleep(Duration::from_millis(300)).await;
    let (_, body) = send(&app, Method::GET, "/api/status", None).await;
    assert_eq!(body["status"], "DONE");
    assert_eq!(body["outputs"]["slow"], "finished");
}
