//! Flow-field prompt: a fixed system instruction plus per-request user content.
//!
//! The cloud backend receives the two parts as separate chat messages; the local backend
//! takes one flat prompt, so [`render_combined_prompt`] joins them. Both carry the same text.

use crate::model::{Coordinate, GameObject, GenerateRequest, SceneGraph, WorldBounds};
use std::fmt::Write;

/// System instruction for the flow-field model.
pub const FLOW_FIELD_SYSTEM: &str = r#"You are an assistant that designs flow fields for a boid flock. A flow field is a list of directed line segments (vectors) the flock follows.
The user provides a scene graph, the current flock position, a list of available flying styles, and a prompt describing how the flock should behave. Choose the behavioral style that best fits the prompt and generate the vectors that guide the flock.

Respond with a single JSON object with exactly these fields:
- style: the best matching style from the available styles. If no style matches the prompt exactly, pick the closest one.
- vectors: a list of directed segments. Each segment has a start coordinate `s` and an end coordinate `e`, each with numeric `x`, `y` and `z`.

Constraints:
1. world_bounds is the axis-aligned box of the scene given by its min and max corners. The flock must never leave it.
2. Every start point `s` and end point `e` must lie inside world_bounds.
3. game_objects lists the objects in the scene. The flock must not collide with them; route segments around their origin and bounds.
4. Place the vectors according to the object positions and the current flock position so the flock reaches the desired destination or follows the desired path.
5. Generate at least 6 vectors, evenly spaced across the scene, so the field is dense and reliable. Extra vectors are welcome when they help the flock navigate.

The scene uses Unity's LEFT-HANDED coordinate system. From the flock's point of view:
- the X axis points RIGHT
- the Y axis points UP
- the Z axis points FORWARD

Example. For world_bounds min (x=-50, y=0, z=-50), max (x=50, y=30, z=50) and a prompt asking the flock to fly forward calmly, a valid response is:
{
  "style": "calm",
  "vectors": [
    { "s": { "x": -40.0, "y": 10.0, "z": -40.0 }, "e": { "x": -40.0, "y": 10.0, "z": -20.0 } },
    { "s": { "x": 0.0, "y": 10.0, "z": -40.0 }, "e": { "x": 0.0, "y": 10.0, "z": -20.0 } },
    { "s": { "x": 40.0, "y": 10.0, "z": -40.0 }, "e": { "x": 40.0, "y": 10.0, "z": -20.0 } },
    { "s": { "x": -40.0, "y": 12.0, "z": 10.0 }, "e": { "x": -40.0, "y": 12.0, "z": 30.0 } },
    { "s": { "x": 0.0, "y": 12.0, "z": 10.0 }, "e": { "x": 0.0, "y": 12.0, "z": 30.0 } },
    { "s": { "x": 40.0, "y": 12.0, "z": 10.0 }, "e": { "x": 40.0, "y": 12.0, "z": 30.0 } }
  ]
}
Every number must be a float inside the given world_bounds and the style must come from the available styles. Treat the vectors as force vectors or path segments that steer the flock."#;

/// The constant system instruction.
pub fn render_system_prompt() -> &'static str {
    FLOW_FIELD_SYSTEM
}

fn coordinate(c: &Coordinate) -> String {
    format!("(x={}, y={}, z={})", c.x, c.y, c.z)
}

fn bounds(b: &WorldBounds) -> String {
    format!("min {}, max {}", coordinate(&b.min), coordinate(&b.max))
}

fn game_object_line(object: &GameObject) -> String {
    match &object.bounds {
        Some(b) => format!("- {}: origin {}, bounds {}", object.name, coordinate(&object.origin), bounds(b)),
        None => format!("- {}: origin {}, point object", object.name, coordinate(&object.origin)),
    }
}

fn scene_graph_section(scene: &SceneGraph) -> String {
    let mut out = format!(
        "The corners of the scene's bounding box (world_bounds) are: {}.\nThe objects currently in the scene (game_objects) are:",
        bounds(&scene.world_bounds)
    );
    if scene.game_objects.is_empty() {
        out.push_str("\n- none");
    }
    for object in &scene.game_objects {
        let _ = write!(out, "\n{}", game_object_line(object));
    }
    out
}

fn styles_section(styles: &[String]) -> String {
    let quoted: Vec<String> = styles
        .iter()
        .map(|s| serde_json::Value::String(s.clone()).to_string())
        .collect();
    format!("The available styles are the following: [{}]", quoted.join(", "))
}

/// Per-request user content. Order is fixed: scene graph, flock position, prompt, styles.
/// Pure: identical requests give byte-identical output.
pub fn render_user_content(request: &GenerateRequest) -> String {
    let p = &request.flock_position;
    [
        scene_graph_section(&request.scene_graph),
        format!("The current position of the boid flock is x={}, y={}, z={}.", p.x, p.y, p.z),
        format!("The user's prompt is: {}", request.prompt),
        styles_section(&request.available_styles),
    ]
    .join("\n\n")
}

/// Single flat prompt for backends without chat roles.
pub fn render_combined_prompt(request: &GenerateRequest) -> String {
    format!("{}\n\n{}", FLOW_FIELD_SYSTEM, render_user_content(request))
}
