//! FlowField core library.
//! Turns a natural-language prompt plus scene context into a validated flow field
//! (behavioral style + directed 3D vectors) using a cloud or a local LLM backend.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod model;
pub mod prompts;
pub mod providers;
pub mod schema;
pub mod stt;

pub use config::GatewayConfig;
pub use dispatcher::{DispatchError, Dispatcher, Route};
pub use error::{ErrorKind, GenerateError, GenerateResult, SchemaViolation};
pub use model::{
    Coordinate, DirectedVector, GameObject, GenerateRequest, GenerateResponse, SamplingParams,
    SceneGraph, WorldBounds,
};
pub use providers::{CloudProvider, FlowProvider, LocalProvider, ProviderKind};
pub use schema::{parse_flow_field, response_schema, validate_flow_field};
pub use stt::{create_stt, AudioClip, SpeechToText, SttError, SttResult};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
