//! vidprompt - Video Prompt Composer
//!
//! Turns a structured video brief (subject, style, setting, palette, audio,
//! dialogue, ten-shot camera plan, duration, aspect ratio) into a
//! shot-by-shot prompt for AI video generators, using a generative text
//! model. Individual brief fields can be filled from model suggestions.
//!
//! # Modules
//!
//! - [`domain`] - Brief, result and suggestion-field types
//! - [`llm`] - Generation client trait with Gemini and OpenAI backends
//! - [`prompts`] - Instruction templates and composition
//! - [`decode`] - Response decoding and repair
//! - [`pipeline`] - Compose/execute/decode, suggestion batches, translation cache
//! - [`history`] - Bounded, persisted generation history
//! - [`clipboard`] - Clipboard seam
//! - [`studio`] - Facade a front end drives
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod decode;
pub mod domain;
pub mod history;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod studio;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use decode::{DecodeError, Decoded, decode};
pub use domain::{
    AspectRatio, Brief, DialogueLine, GeneratedResult, Language, SHOT_COUNT, SharedBrief, Shot, SuggestionField,
    SuggestionSink, SuggestionValue,
};
pub use history::{History, HistoryEntry, HistoryError, HistoryRepository, MAX_HISTORY_ENTRIES};
pub use llm::{CompletionRequest, ComputeMode, LlmClient, LlmError, OutputContract, create_client};
pub use pipeline::{Pipeline, PipelineError, RefreshError, RefreshReport, SuggestionOrchestrator};
pub use prompts::PromptComposer;
pub use studio::{GenerationState, OutputView, Studio};
