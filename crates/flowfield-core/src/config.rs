//! Gateway configuration: read once at startup, immutable afterwards.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | FLOWFIELD__BIND_ADDR | 0.0.0.0:8000 | Listen address. |
//! | OPENAI_API_KEY | (unset) | Cloud backend key. Cloud calls fail upstream without it. |
//! | OPENAI_BASE_URL | https://api.openai.com/v1 | Cloud backend base URL. |
//! | OLLAMA_HOST | http://localhost:11434 | Local inference server. |
//! | OLLAMA_MODEL | llama3 | Model used for local requests. |
//! | FLOWFIELD__LOCAL_SENTINEL | ollama | `model_id` value that selects the local backend. |
//! | FLOWFIELD__REQUEST_TIMEOUT_SECS | 120 | Per-call backend timeout. |
//! | FLOWFIELD__PROBE_TIMEOUT_SECS | 5 | Startup liveness probe timeout. |
//! | WHISPER_MODEL_PATH | (unset) | ggml Whisper model (needs the `whisper` feature). |
//! | WHISPER_LANGUAGE | en | Transcription language. |

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";
pub const DEFAULT_LOCAL_SENTINEL: &str = "ollama";

/// Conventional variables applied on top of file and `FLOWFIELD__*` sources.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("openai_api_key", "OPENAI_API_KEY"),
    ("openai_base_url", "OPENAI_BASE_URL"),
    ("ollama_host", "OLLAMA_HOST"),
    ("ollama_model", "OLLAMA_MODEL"),
    ("whisper_model_path", "WHISPER_MODEL_PATH"),
    ("whisper_language", "WHISPER_LANGUAGE"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub bind_addr: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub ollama_host: String,
    pub ollama_model: String,
    pub local_sentinel: String,
    pub request_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    #[serde(default)]
    pub whisper_model_path: Option<String>,
    pub whisper_language: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            local_sentinel: DEFAULT_LOCAL_SENTINEL.to_string(),
            request_timeout_secs: 120,
            probe_timeout_secs: 5,
            whisper_model_path: None,
            whisper_language: "en".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Load `.env`, then layer: defaults < config file < `FLOWFIELD__*` < conventional env vars.
    /// File path: env `FLOWFIELD_CONFIG`, else `config/gateway` when present.
    pub fn load() -> Result<Self, config::ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!(target: "flowfield::config", ".env not loaded: {} (using system environment)", e);
        }

        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("bind_addr", defaults.bind_addr)?
            .set_default("openai_base_url", defaults.openai_base_url)?
            .set_default("ollama_host", defaults.ollama_host)?
            .set_default("ollama_model", defaults.ollama_model)?
            .set_default("local_sentinel", defaults.local_sentinel)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("probe_timeout_secs", defaults.probe_timeout_secs as i64)?
            .set_default("whisper_language", defaults.whisper_language)?;

        let builder = match std::env::var("FLOWFIELD_CONFIG") {
            Ok(path) if Path::new(&path).exists() => builder.add_source(config::File::from(Path::new(&path))),
            Ok(path) => {
                tracing::warn!(target: "flowfield::config", "FLOWFIELD_CONFIG={} does not exist; ignoring", path);
                builder
            }
            Err(_) => builder.add_source(config::File::with_name("config/gateway").required(false)),
        };

        let mut builder = builder.add_source(config::Environment::with_prefix("FLOWFIELD").separator("__"));
        for (key, var) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, env_opt_string(var))?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
