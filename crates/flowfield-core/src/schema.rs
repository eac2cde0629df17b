//! Output contract: the JSON Schema sent to both backends and the validation applied
//! to whatever comes back.
//!
//! Classification order for raw completion text:
//! 1. blank text → `EmptyResponse`
//! 2. not JSON → `MalformedPayload`
//! 3. JSON that fails the schema → `SchemaMismatch` (every violation, with its path)

use crate::error::{GenerateError, GenerateResult, SchemaViolation};
use crate::model::GenerateResponse;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// Name the cloud backend attaches to the structured-output format.
pub const RESPONSE_SCHEMA_NAME: &str = "GenerateResponse";

fn coordinate_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "x": { "type": "number" },
            "y": { "type": "number" },
            "z": { "type": "number" }
        },
        "required": ["x", "y", "z"],
        "additionalProperties": false
    })
}

/// Strict schema for [`GenerateResponse`]: every property required, no extras.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "style": { "type": "string" },
            "vectors": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "s": coordinate_schema(),
                        "e": coordinate_schema()
                    },
                    "required": ["s", "e"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["style", "vectors"],
        "additionalProperties": false
    })
}

static VALIDATOR: Lazy<Result<jsonschema::Validator, String>> = Lazy::new(|| {
    jsonschema::validator_for(&response_schema())
        .map_err(|e| format!("Invalid response schema: {}", e))
});

/// Validate an already-parsed payload and convert it into the typed response.
pub fn validate_flow_field(value: Value) -> GenerateResult<GenerateResponse> {
    let validator = VALIDATOR
        .as_ref()
        .map_err(|e| GenerateError::Internal(e.clone()))?;

    let violations: Vec<SchemaViolation> = validator
        .iter_errors(&value)
        .map(|err| SchemaViolation {
            path: err.instance_path.to_string(),
            message: err.to_string(),
        })
        .collect();
    if !violations.is_empty() {
        return Err(GenerateError::SchemaMismatch(violations));
    }

    serde_json::from_value(value).map_err(|e| {
        GenerateError::SchemaMismatch(vec![SchemaViolation {
            path: String::new(),
            message: e.to_string(),
        }])
    })
}

/// Parse raw completion text into a validated response.
pub fn parse_flow_field(text: &str) -> GenerateResult<GenerateResponse> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GenerateError::EmptyResponse);
    }
    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| GenerateError::MalformedPayload(e.to_string()))?;
    validate_flow_field(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn kind_of(text: &str) -> ErrorKind {
        parse_flow_field(text).unwrap_err().kind()
    }

    #[test]
    fn blank_text_is_empty_response() {
        assert_eq!(kind_of(""), ErrorKind::EmptyResponse);
        assert_eq!(kind_of("  \n"), ErrorKind::EmptyResponse);
    }

    #[test]
    fn broken_json_is_malformed() {
        assert_eq!(kind_of("{not json"), ErrorKind::MalformedPayload);
        assert_eq!(kind_of("Sure! Here is your flow field:"), ErrorKind::MalformedPayload);
    }

    #[test]
    fn missing_vectors_is_schema_mismatch() {
        assert_eq!(kind_of(r#"{"style": "x"}"#), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn violations_name_the_offending_path() {
        let err = parse_flow_field(
            r#"{"style":"calm","vectors":[{"s":{"x":1,"y":2,"z":3},"e":{"x":"far","y":2,"z":3}}]}"#,
        )
        .unwrap_err();
        match err {
            GenerateError::SchemaMismatch(violations) => {
                assert!(violations.iter().any(|v| v.path == "/vectors/0/e/x"));
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn extra_fields_are_rejected() {
        let err = parse_flow_field(r#"{"style":"calm","vectors":[],"confidence":0.9}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn empty_vector_list_is_accepted() {
        let resp = parse_flow_field(r#"{"style":"calm","vectors":[]}"#).unwrap();
        assert_eq!(resp.style, "calm");
        assert!(resp.vectors.is_empty());
    }

    #[test]
    fn integers_are_accepted_as_coordinates() {
        let resp = parse_flow_field(
            r#"{"style":"calm","vectors":[{"s":{"x":1,"y":0,"z":-4},"e":{"x":2.5,"y":0,"z":-4}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.vectors[0].s.z, -4.0);
        assert_eq!(resp.vectors[0].e.x, 2.5);
    }
}
