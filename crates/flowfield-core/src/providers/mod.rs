//! Provider adapters: one per backend call convention.

pub mod cloud;
pub mod local;

use crate::error::GenerateResult;
use crate::model::{GenerateRequest, GenerateResponse, SamplingParams};
use async_trait::async_trait;
use std::fmt;

pub use cloud::CloudProvider;
pub use local::LocalProvider;

/// Which backend answered (or was attempted) for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Cloud,
    Local,
}

impl ProviderKind {
    /// Vendor name used in user-facing error details.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::Cloud => "OpenAI",
            ProviderKind::Local => "Ollama",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A backend that turns a request into a validated flow field.
///
/// Implementations either return a complete [`GenerateResponse`] or a classified
/// [`crate::GenerateError`]; nothing partial.
#[async_trait]
pub trait FlowProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn generate(
        &self,
        request: &GenerateRequest,
        model: &str,
        sampling: &SamplingParams,
    ) -> GenerateResult<GenerateResponse>;
}

/// Detail for an error reply whose body could not be parsed. The body itself is never echoed.
pub(crate) fn status_line(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
        None => format!("HTTP {}", status.as_u16()),
    }
}

/// First `max` characters of the prompt, for log previews.
pub(crate) fn preview(prompt: &str, max: usize) -> String {
    let mut out: String = prompt.chars().take(max).collect();
    if prompt.chars().count() > max {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_uses_canonical_reason() {
        assert_eq!(status_line(reqwest::StatusCode::BAD_GATEWAY), "HTTP 502 Bad Gateway");
        assert_eq!(
            status_line(reqwest::StatusCode::from_u16(599).unwrap()),
            "HTTP 599"
        );
    }

    #[test]
    fn preview_truncates_long_prompts() {
        assert_eq!(preview("short", 50), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
    }
}
