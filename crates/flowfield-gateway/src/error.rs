//! `{"detail": ...}` error bodies and the failure → status mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flowfield_core::{DispatchError, ErrorKind, GenerateError};
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

/// Upstream keeps the backend's own status when it is an error code.
fn status_for(err: &DispatchError) -> StatusCode {
    match err.kind() {
        ErrorKind::Upstream => match &err.source {
            GenerateError::Upstream {
                status: Some(code), ..
            } if (400..=599).contains(code) => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::EmptyResponse
        | ErrorKind::MalformedPayload
        | ErrorKind::SchemaMismatch
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        Self::new(status_for(&err), err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowfield_core::ProviderKind;
    use std::time::Duration;

    fn dispatch_error(provider: ProviderKind, source: GenerateError) -> DispatchError {
        DispatchError {
            provider,
            model: "m".to_string(),
            source,
        }
    }

    fn upstream(status: Option<u16>) -> GenerateError {
        GenerateError::Upstream {
            status,
            message: "boom".to_string(),
            request_id: None,
        }
    }

    #[test]
    fn upstream_keeps_error_status() {
        let err = ApiError::from(dispatch_error(ProviderKind::Cloud, upstream(Some(429))));
        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.detail, "OpenAI API error: boom");
    }

    #[test]
    fn upstream_without_error_status_is_500() {
        let err = ApiError::from(dispatch_error(ProviderKind::Local, upstream(Some(302))));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        let err = ApiError::from(dispatch_error(ProviderKind::Local, upstream(None)));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.detail.starts_with("Ollama API error"));
    }

    #[test]
    fn kinds_map_to_statuses() {
        let cases = [
            (GenerateError::ServiceUnavailable("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (GenerateError::Timeout(Duration::from_secs(3)), StatusCode::GATEWAY_TIMEOUT),
            (GenerateError::EmptyResponse, StatusCode::INTERNAL_SERVER_ERROR),
            (GenerateError::MalformedPayload("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (GenerateError::SchemaMismatch(Vec::new()), StatusCode::INTERNAL_SERVER_ERROR),
            (GenerateError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (source, expected) in cases {
            let err = ApiError::from(dispatch_error(ProviderKind::Local, source));
            assert_eq!(err.status, expected, "{}", err.detail);
        }
    }
}
