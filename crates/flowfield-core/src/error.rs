//! Failure taxonomy shared by both provider adapters.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for adapter calls.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// One field-level mismatch between a backend payload and the response schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON pointer into the payload, e.g. `/vectors/2/s/x`. Empty for the root.
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { self.path.as_str() };
        write!(f, "{} at {}", self.message, path)
    }
}

/// Discriminant of [`GenerateError`], for callers that only need the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Upstream,
    ServiceUnavailable,
    EmptyResponse,
    MalformedPayload,
    SchemaMismatch,
    Timeout,
    Internal,
}

/// Errors an adapter classifies at the point of detection.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// Backend reported an API-level error.
    #[error("API error: {message}{}", request_id_suffix(.request_id))]
    Upstream {
        status: Option<u16>,
        message: String,
        request_id: Option<String>,
    },

    /// Local backend failed its startup probe; no call was attempted.
    #[error("backend is unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("backend returned an empty completion")]
    EmptyResponse,

    #[error("completion is not valid JSON: {0}")]
    MalformedPayload(String),

    #[error("completion does not match the response schema: {}", join_violations(.0))]
    SchemaMismatch(Vec<SchemaViolation>),

    #[error("backend did not answer within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("generation failed: {0}")]
    Internal(String),
}

impl GenerateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerateError::Upstream { .. } => ErrorKind::Upstream,
            GenerateError::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            GenerateError::EmptyResponse => ErrorKind::EmptyResponse,
            GenerateError::MalformedPayload(_) => ErrorKind::MalformedPayload,
            GenerateError::SchemaMismatch(_) => ErrorKind::SchemaMismatch,
            GenerateError::Timeout(_) => ErrorKind::Timeout,
            GenerateError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Classify a transport error; reqwest timeouts keep their own kind.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            GenerateError::Timeout(timeout)
        } else {
            GenerateError::Internal(err.to_string())
        }
    }
}

fn request_id_suffix(request_id: &Option<String>) -> String {
    match request_id {
        Some(id) => format!(" (Request ID: {})", id),
        None => String::new(),
    }
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
