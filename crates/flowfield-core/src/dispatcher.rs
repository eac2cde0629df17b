//! Dispatcher: picks exactly one adapter per request and tags its failures with the
//! provider that was attempted. One attempt per request; no retries, no fallback.

use crate::config::GatewayConfig;
use crate::error::{ErrorKind, GenerateError};
use crate::model::{GenerateRequest, GenerateResponse};
use crate::providers::{CloudProvider, FlowProvider, LocalProvider, ProviderKind};
use std::sync::Arc;
use thiserror::Error;

/// Routing decision, made once at entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Cloud { model: String },
    Local { model: String },
}

impl Route {
    pub fn provider(&self) -> ProviderKind {
        match self {
            Route::Cloud { .. } => ProviderKind::Cloud,
            Route::Local { .. } => ProviderKind::Local,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Route::Cloud { model } | Route::Local { model } => model,
        }
    }
}

/// An adapter failure plus the provider and model it came from. The kind is never rewritten.
#[derive(Error, Debug)]
#[error("{provider} {source}")]
pub struct DispatchError {
    pub provider: ProviderKind,
    pub model: String,
    #[source]
    pub source: GenerateError,
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

pub struct Dispatcher {
    cloud: Arc<dyn FlowProvider>,
    local: Arc<dyn FlowProvider>,
    local_model: String,
    local_sentinel: String,
}

impl Dispatcher {
    pub fn new(
        cloud: Arc<dyn FlowProvider>,
        local: Arc<dyn FlowProvider>,
        local_model: impl Into<String>,
        local_sentinel: impl Into<String>,
    ) -> Self {
        Self {
            cloud,
            local,
            local_model: local_model.into(),
            local_sentinel: local_sentinel.into(),
        }
    }

    /// Build both real adapters. Probes the local backend once.
    pub async fn from_config(config: &GatewayConfig) -> Self {
        let cloud = Arc::new(CloudProvider::from_config(config));
        let local = Arc::new(LocalProvider::from_config(config).await);
        Self::new(cloud, local, config.ollama_model.clone(), config.local_sentinel.clone())
    }

    /// `model_id` absent or equal to the local sentinel → local default model; anything else
    /// → cloud with that exact string as the model name.
    pub fn route(&self, model_id: Option<&str>) -> Route {
        match model_id {
            Some(id) if id != self.local_sentinel => Route::Cloud { model: id.to_string() },
            _ => Route::Local {
                model: self.local_model.clone(),
            },
        }
    }

    pub async fn dispatch(&self, request: &GenerateRequest) -> Result<GenerateResponse, DispatchError> {
        let route = self.route(request.model_id.as_deref());
        let sampling = request.sampling();
        let provider = match route.provider() {
            ProviderKind::Cloud => &self.cloud,
            ProviderKind::Local => &self.local,
        };

        tracing::debug!(
            target: "flowfield::dispatch",
            "Routing to {} (model '{}', temperature {}, top_k {}, top_p {})",
            provider.kind(),
            route.model(),
            sampling.temperature,
            sampling.top_k,
            sampling.top_p
        );

        provider
            .generate(request, route.model(), &sampling)
            .await
            .map_err(|source| DispatchError {
                provider: provider.kind(),
                model: route.model().to_string(),
                source,
            })
    }
}
