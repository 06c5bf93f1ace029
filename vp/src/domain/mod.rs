//! Domain types for vidprompt
//!
//! Brief (user input), GeneratedResult (model output), the suggestible
//! fields and the explicit output language.

mod brief;
mod field;
mod language;
mod result;

pub use brief::{
    ART_STYLES, AspectRatio, Brief, BriefError, CAMERA_ANGLES, DEFAULT_DURATION_SECS, DialogueLine,
    MAX_DURATION_SECS, MIN_DURATION_SECS, SHOT_COUNT,
};
pub use field::{SharedBrief, SuggestionField, SuggestionSink, SuggestionValue};
pub use language::{Language, Messages};
pub use result::{GeneratedResult, Shot, TimingCheck};

#[cfg(test)]
pub(crate) use result::fixtures;
