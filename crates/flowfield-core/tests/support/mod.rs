//! Shared fixtures for the core integration tests.
#![allow(dead_code)]

use flowfield_core::{Coordinate, GameObject, GenerateRequest, SceneGraph, WorldBounds};
use serde_json::json;

pub fn sample_request(model_id: Option<&str>) -> GenerateRequest {
    GenerateRequest {
        prompt: "Fly aggressively around the lighthouse".to_string(),
        flock_position: Coordinate::new(0.0, 5.0, -10.0),
        scene_graph: SceneGraph {
            world_bounds: WorldBounds {
                min: Coordinate::new(-50.0, 0.0, -50.0),
                max: Coordinate::new(50.0, 30.0, 50.0),
            },
            game_objects: vec![GameObject {
                name: "Lighthouse".to_string(),
                origin: Coordinate::new(12.0, 0.0, 8.0),
                bounds: None,
            }],
        },
        available_styles: vec!["aggressive".to_string(), "calm".to_string()],
        model_id: model_id.map(String::from),
        temperature: None,
        top_k: None,
        top_p: None,
    }
}

/// Schema-conformant flow field with `count` vectors.
pub fn flow_field_json(style: &str, count: usize) -> serde_json::Value {
    let vectors: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            let x = -35.0 + 10.0 * i as f64;
            json!({
                "s": { "x": x, "y": 10.0, "z": -20.0 },
                "e": { "x": x, "y": 10.0, "z": 0.0 }
            })
        })
        .collect();
    json!({ "style": style, "vectors": vectors })
}

/// OpenAI chat completion envelope around `content`.
pub fn chat_completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content, "refusal": null },
            "finish_reason": "stop"
        }]
    })
}

/// Ollama non-streaming generate envelope around `response`.
pub fn ollama_reply(response: &str) -> serde_json::Value {
    json!({
        "model": "llama3",
        "created_at": "2025-01-01T00:00:00Z",
        "response": response,
        "done": true
    })
}
