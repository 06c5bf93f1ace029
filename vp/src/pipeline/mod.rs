//! Generation pipeline
//!
//! Runs compose -> execute -> decode for full briefs, field suggestions and
//! translations, and coordinates suggestion batches.

mod error;
mod generation;
mod orchestrator;
mod tracker;
mod translation;

pub use error::{FailureKind, PipelineError, RefreshError};
pub use generation::Pipeline;
pub use orchestrator::{RefreshReport, SuggestionOrchestrator, SuggestionOutcome};
pub use tracker::{RequestToken, RequestTracker};
pub use translation::TranslationCache;
