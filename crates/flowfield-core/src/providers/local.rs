//! Local adapter: Ollama `/api/generate` with a flat prompt and a JSON-schema `format`.
//!
//! Liveness is probed once at startup (`GET /api/tags`). An unreachable server marks the
//! adapter unavailable and every call fails fast without network I/O.
//! Unlike the cloud backend, output conformance is not guaranteed, so raw text is parsed
//! and validated here.

use super::{preview, status_line, FlowProvider, ProviderKind};
use crate::config::GatewayConfig;
use crate::error::{GenerateError, GenerateResult};
use crate::model::{GenerateRequest, GenerateResponse, SamplingParams};
use crate::prompts::render_combined_prompt;
use crate::schema::{parse_flow_field, response_schema};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    raw: bool,
    format: serde_json::Value,
    options: SamplingOptions,
}

#[derive(Serialize)]
struct SamplingOptions {
    temperature: f32,
    top_k: u32,
    top_p: f32,
}

#[derive(Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct ErrorReply {
    error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Availability {
    Ready,
    Unavailable(String),
}

pub struct LocalProvider {
    host: String,
    timeout: Duration,
    availability: Availability,
    client: reqwest::Client,
}

impl LocalProvider {
    /// Probe the server once and build the adapter. Never fails: an unreachable server
    /// yields an adapter that answers every call with `ServiceUnavailable`.
    pub async fn connect(host: impl Into<String>, timeout: Duration, probe_timeout: Duration) -> Self {
        let host = host.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::new();
        let availability = match probe(&client, &host, probe_timeout).await {
            Ok(()) => {
                info!(target: "flowfield::local", "Ollama reachable at {}", host);
                Availability::Ready
            }
            Err(reason) => {
                warn!(
                    target: "flowfield::local",
                    "Ollama unreachable at {}: {}. Local generation disabled until restart.",
                    host,
                    reason
                );
                Availability::Unavailable(reason)
            }
        };
        Self {
            host,
            timeout,
            availability,
            client,
        }
    }

    pub async fn from_config(config: &GatewayConfig) -> Self {
        info!(target: "flowfield::local", "Configuring Ollama client for host: {}", config.ollama_host);
        Self::connect(config.ollama_host.clone(), config.request_timeout(), config.probe_timeout()).await
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Ready
    }

    async fn complete(
        &self,
        request: &GenerateRequest,
        model: &str,
        sampling: &SamplingParams,
    ) -> GenerateResult<GenerateResponse> {
        let body = GenerateBody {
            model,
            prompt: render_combined_prompt(request),
            stream: false,
            raw: true,
            format: response_schema(),
            options: SamplingOptions {
                temperature: sampling.temperature,
                top_k: sampling.top_k,
                top_p: sampling.top_p,
            },
        };

        let url = format!("{}/api/generate", self.host);
        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerateError::from_transport(e, self.timeout))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| GenerateError::from_transport(e, self.timeout))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorReply>(&text)
                .map(|r| r.error)
                .unwrap_or_else(|_| status_line(status));
            return Err(GenerateError::Upstream {
                status: Some(status.as_u16()),
                message,
                request_id: None,
            });
        }

        let reply: GenerateReply = serde_json::from_str(&text)
            .map_err(|e| GenerateError::Internal(format!("unexpected Ollama envelope: {}", e)))?;
        debug!(target: "flowfield::local", "Raw Ollama completion: {}", reply.response);
        parse_flow_field(&reply.response)
    }
}

async fn probe(client: &reqwest::Client, host: &str, probe_timeout: Duration) -> Result<(), String> {
    let res = client
        .get(format!("{}/api/tags", host))
        .timeout(probe_timeout)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if res.status().is_success() {
        Ok(())
    } else {
        Err(format!("liveness probe returned {}", res.status()))
    }
}

#[async_trait]
impl FlowProvider for LocalProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    async fn generate(
        &self,
        request: &GenerateRequest,
        model: &str,
        sampling: &SamplingParams,
    ) -> GenerateResult<GenerateResponse> {
        if let Availability::Unavailable(reason) = &self.availability {
            return Err(GenerateError::ServiceUnavailable(format!(
                "Ollama at {} was unreachable at startup ({})",
                self.host, reason
            )));
        }

        info!(
            target: "flowfield::local",
            "Generation request for Ollama model '{}' with prompt: '{}'",
            model,
            preview(&request.prompt, 50)
        );

        let result = match tokio::time::timeout(self.timeout, self.complete(request, model, sampling)).await {
            Ok(result) => result,
            Err(_) => Err(GenerateError::Timeout(self.timeout)),
        };

        match &result {
            Ok(response) => info!(
                target: "flowfield::local",
                "Parsed Ollama response: style '{}', {} vectors",
                response.style,
                response.vectors.len()
            ),
            Err(e) => error!(target: "flowfield::local", "Ollama generation failed: {}", e),
        }
        result
    }
}
