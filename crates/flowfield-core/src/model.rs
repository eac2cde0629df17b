//! Request and response model for flow-field generation.
//! Scene geometry uses Unity's left-handed frame: X right, Y up, Z forward.

use serde::{Deserialize, Serialize};

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Directed segment from `s` to `e`; read as a force or path segment by the flock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectedVector {
    pub s: Coordinate,
    pub e: Coordinate,
}

/// Axis-aligned box. `min <= max` per axis is assumed, not checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: Coordinate,
    pub max: Coordinate,
}

/// A named obstacle or landmark. No bounds means a point object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameObject {
    pub name: String,
    pub origin: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<WorldBounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
    pub world_bounds: WorldBounds,
    #[serde(default)]
    pub game_objects: Vec<GameObject>,
}

pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_TOP_K: u32 = 10;
pub const DEFAULT_TOP_P: f32 = 0.6;

/// Sampling parameters handed explicitly to every adapter.
///
/// | Field | Default |
/// |-------|---------|
/// | temperature | 0.5 |
/// | top_k | 10 (dropped by the cloud backend) |
/// | top_p | 0.6 |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_k: DEFAULT_TOP_K,
            top_p: DEFAULT_TOP_P,
        }
    }
}

/// Inbound `POST /generate` body. Built once per call and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub flock_position: Coordinate,
    pub scene_graph: SceneGraph,
    pub available_styles: Vec<String>,
    /// Provider selector: absent or the local sentinel routes to the local backend.
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_k: Option<u32>,
    #[serde(default)]
    pub top_p: Option<f32>,
}

impl GenerateRequest {
    /// Resolve wire-level sampling fields; absent or null fields take the documented defaults.
    pub fn sampling(&self) -> SamplingParams {
        let defaults = SamplingParams::default();
        SamplingParams {
            temperature: self.temperature.unwrap_or(defaults.temperature),
            top_k: self.top_k.unwrap_or(defaults.top_k),
            top_p: self.top_p.unwrap_or(defaults.top_p),
        }
    }

    /// Checks that cannot be expressed by deserialization alone.
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt.trim().is_empty() {
            return Err("prompt must not be empty".to_string());
        }
        if self.available_styles.is_empty() {
            return Err("available_styles must contain at least one style".to_string());
        }
        Ok(())
    }
}

/// Validated model output: the chosen style and the flow field.
///
/// `style` is reported exactly as the backend chose it, even when it is not one of the
/// request's `available_styles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub style: String,
    pub vectors: Vec<DirectedVector>,
}
