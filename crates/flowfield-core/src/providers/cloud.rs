//! Cloud adapter: OpenAI chat completions with a strict `json_schema` response format.
//!
//! The backend promises schema-conformant output; the adapter still validates it before
//! handing it on. `top_k` has no equivalent in this API and is dropped.

use super::{preview, status_line, FlowProvider, ProviderKind};
use crate::config::GatewayConfig;
use crate::error::{GenerateError, GenerateResult};
use crate::model::{GenerateRequest, GenerateResponse, SamplingParams};
use crate::prompts::{render_system_prompt, render_user_content};
use crate::schema::{parse_flow_field, response_schema, RESPONSE_SCHEMA_NAME};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatMessageResponse>,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pull the human-readable message out of an OpenAI error body, falling back to the status line.
fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => status_line(status),
    }
}

pub struct CloudProvider {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl CloudProvider {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        if config.openai_api_key.is_none() {
            tracing::warn!(
                target: "flowfield::cloud",
                "OPENAI_API_KEY not set. Cloud requests will be rejected by the backend."
            );
        }
        Self::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.request_timeout(),
        )
    }

    async fn complete(
        &self,
        request: &GenerateRequest,
        model: &str,
        sampling: &SamplingParams,
    ) -> GenerateResult<GenerateResponse> {
        let user_content = render_user_content(request);
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: render_system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: &user_content,
                },
            ],
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: RESPONSE_SCHEMA_NAME,
                    strict: true,
                    schema: response_schema(),
                },
            },
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let res = builder
            .send()
            .await
            .map_err(|e| GenerateError::from_transport(e, self.timeout))?;

        let status = res.status();
        let request_id = res
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let text = res
            .text()
            .await
            .map_err(|e| GenerateError::from_transport(e, self.timeout))?;

        if !status.is_success() {
            return Err(GenerateError::Upstream {
                status: Some(status.as_u16()),
                message: api_error_message(status, &text),
                request_id,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| GenerateError::Internal(format!("unexpected completion envelope: {}", e)))?;
        let message = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .ok_or(GenerateError::EmptyResponse)?;
        if let Some(refusal) = message.refusal.filter(|r| !r.trim().is_empty()) {
            return Err(GenerateError::Internal(format!("model refused: {}", refusal)));
        }
        parse_flow_field(message.content.as_deref().unwrap_or_default())
    }
}

#[async_trait]
impl FlowProvider for CloudProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Cloud
    }

    async fn generate(
        &self,
        request: &GenerateRequest,
        model: &str,
        sampling: &SamplingParams,
    ) -> GenerateResult<GenerateResponse> {
        info!(
            target: "flowfield::cloud",
            "Generation request for OpenAI model '{}' with prompt: '{}'",
            model,
            preview(&request.prompt, 50)
        );
        debug!(target: "flowfield::cloud", "top_k={} is not supported by this backend; dropped", sampling.top_k);

        let result = match tokio::time::timeout(self.timeout, self.complete(request, model, sampling)).await {
            Ok(result) => result,
            Err(_) => Err(GenerateError::Timeout(self.timeout)),
        };

        match &result {
            Ok(response) => {
                info!(
                    target: "flowfield::cloud",
                    "Parsed OpenAI response: style '{}', {} vectors",
                    response.style,
                    response.vectors.len()
                );
                debug!(target: "flowfield::cloud", "Payload: {:?}", response);
            }
            Err(e) => error!(target: "flowfield::cloud", "OpenAI generation failed: {}", e),
        }
        result
    }
}
