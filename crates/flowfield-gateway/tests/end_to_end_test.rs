//! Full stack: router → dispatcher → real adapters → mock OpenAI / Ollama servers.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use flowfield_core::{Dispatcher, GatewayConfig};
use flowfield_gateway::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request_body(model_id: Option<&str>) -> Value {
    json!({
        "prompt": "Fly aggressively around the lighthouse",
        "flock_position": { "x": 0.0, "y": 5.0, "z": -10.0 },
        "scene_graph": {
            "world_bounds": {
                "min": { "x": -50.0, "y": 0.0, "z": -50.0 },
                "max": { "x": 50.0, "y": 30.0, "z": 50.0 }
            },
            "game_objects": [
                { "name": "Lighthouse", "origin": { "x": 12.0, "y": 0.0, "z": 8.0 } }
            ]
        },
        "available_styles": ["aggressive", "calm"],
        "model_id": model_id
    })
}

fn flow_field(style: &str, count: usize) -> Value {
    let vectors: Vec<Value> = (0..count)
        .map(|i| {
            let z = -35.0 + 10.0 * i as f64;
            json!({ "s": { "x": -20.0, "y": 8.0, "z": z }, "e": { "x": 20.0, "y": 8.0, "z": z } })
        })
        .collect();
    json!({ "style": style, "vectors": vectors })
}

async fn gateway(openai: &MockServer, ollama: &MockServer) -> Router {
    let config = GatewayConfig {
        openai_api_key: Some("sk-test".to_string()),
        openai_base_url: openai.uri(),
        ollama_host: ollama.uri(),
        request_timeout_secs: 5,
        probe_timeout_secs: 1,
        ..GatewayConfig::default()
    };
    let dispatcher = Dispatcher::from_config(&config).await;
    build_router(Arc::new(AppState {
        dispatcher,
        stt: None,
    }))
}

async fn post_generate(app: Router, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/generate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn ollama_up() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": [] })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn local_down_is_503_without_backend_calls() {
    let openai = MockServer::start().await;
    let ollama = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&ollama)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ollama)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&openai)
        .await;

    let app = gateway(&openai, &ollama).await;
    let (status, body) = post_generate(app, request_body(None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["detail"].as_str().unwrap().starts_with("Ollama"));
}

#[tokio::test]
async fn cloud_flow_field_is_returned_unchanged() {
    let openai = MockServer::start().await;
    let ollama = ollama_up().await;
    let payload = flow_field("aggressive", 8);
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": payload.to_string() },
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&openai)
        .await;

    let app = gateway(&openai, &ollama).await;
    let (status, body) = post_generate(app, request_body(Some("gpt-4o-mini"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, payload);
    assert_eq!(body["vectors"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn local_empty_flow_field_is_accepted() {
    let openai = MockServer::start().await;
    let ollama = ollama_up().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3",
            "response": "{\"style\":\"calm\",\"vectors\":[]}",
            "done": true
        })))
        .expect(1)
        .mount(&ollama)
        .await;

    let app = gateway(&openai, &ollama).await;
    let (status, body) = post_generate(app, request_body(Some("ollama"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "style": "calm", "vectors": [] }));
}

#[tokio::test]
async fn local_schema_mismatch_is_500() {
    let openai = MockServer::start().await;
    let ollama = ollama_up().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3",
            "response": "{\"style\":\"x\"}",
            "done": true
        })))
        .mount(&ollama)
        .await;

    let app = gateway(&openai, &ollama).await;
    let (status, body) = post_generate(app, request_body(None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("vectors"));
}
