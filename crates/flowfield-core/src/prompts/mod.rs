//! Prompt templates for flow-field generation.

pub mod flow_field;

pub use flow_field::{
    render_combined_prompt, render_system_prompt, render_user_content, FLOW_FIELD_SYSTEM,
};
