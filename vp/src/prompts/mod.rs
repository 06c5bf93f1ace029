//! Prompt composition
//!
//! Instruction templates for full-brief generation, per-field suggestions
//! and translation, rendered with Handlebars.

mod composer;
pub mod embedded;

pub use composer::{NO_DIALOGUE_MARKER, PromptComposer, render_dialogue, suggestion_template};
