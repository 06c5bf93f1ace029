//! The user-specified video brief
//!
//! A `Brief` is owned by the active editing session. History keeps cloned
//! snapshots, so edits here never reach recorded entries.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Number of shots in every brief and every generated result
pub const SHOT_COUNT: usize = 10;

/// Shortest video a brief may request, in seconds
pub const MIN_DURATION_SECS: u32 = 3;

/// Longest video a brief may request, in seconds
pub const MAX_DURATION_SECS: u32 = 60;

/// Duration of a fresh brief, in seconds
pub const DEFAULT_DURATION_SECS: u32 = 8;

/// Camera angles offered per shot; the first is the default for new briefs
pub const CAMERA_ANGLES: &[&str] = &[
    "Wide Shot",
    "Medium Shot",
    "Close-up",
    "Extreme Close-up",
    "Over-the-Shoulder Shot",
    "Low Angle",
    "High Angle",
    "Bird's-Eye View",
    "Dutch Angle",
    "Point of View (POV)",
    "Tracking Shot",
    "Dolly Zoom",
];

/// Art styles offered for the style field; the first is the default
pub const ART_STYLES: &[&str] = &[
    "Cinematic",
    "Photorealistic",
    "Anime",
    "3D Animation",
    "Claymation",
    "Watercolor",
    "Cyberpunk",
    "Vintage Film",
];

/// Errors raised while editing or validating a brief
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BriefError {
    #[error("Shot index {index} out of range (brief has {SHOT_COUNT} shots)")]
    ShotOutOfRange { index: usize },

    #[error("Dialogue index {index} out of range (brief has {len} lines)")]
    DialogueOutOfRange { index: usize, len: usize },

    #[error("Duration {0}s outside {MIN_DURATION_SECS}..={MAX_DURATION_SECS}s")]
    DurationOutOfRange(u32),

    #[error("Brief must contain at least one dialogue entry")]
    NoDialogue,

    #[error("Unknown aspect ratio: {0}. Use one of 9:16, 16:9, 1:1, 4:5")]
    UnknownAspectRatio(String),
}

/// Output frame shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Vertical,
}

impl AspectRatio {
    /// Every supported ratio, default first
    pub const ALL: [AspectRatio; 4] = [Self::Portrait, Self::Landscape, Self::Square, Self::Vertical];

    /// The ratio token, e.g. "9:16"
    pub fn token(&self) -> &'static str {
        match self {
            Self::Portrait => "9:16",
            Self::Landscape => "16:9",
            Self::Square => "1:1",
            Self::Vertical => "4:5",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = BriefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ratio| ratio.token() == s.trim())
            .ok_or_else(|| BriefError::UnknownAspectRatio(s.to_string()))
    }
}

/// One spoken line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: String,
    pub line: String,
}

impl DialogueLine {
    pub fn new(speaker: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            line: line.into(),
        }
    }

    /// True when either the speaker or the line is empty after trimming
    pub fn is_blank(&self) -> bool {
        self.speaker.trim().is_empty() || self.line.trim().is_empty()
    }
}

/// Complete user input for one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brief {
    pub subject: String,
    pub style: String,
    pub setting: String,
    pub color_palette: String,
    pub music: String,
    pub sound_effects: String,
    /// Ordered lines, never empty; blank entries are kept for display
    pub dialogue: Vec<DialogueLine>,
    /// One camera angle per shot
    pub camera_angles: [String; SHOT_COUNT],
    pub duration_seconds: u32,
    pub aspect_ratio: AspectRatio,
}

impl Default for Brief {
    fn default() -> Self {
        Self {
            subject: String::new(),
            style: ART_STYLES[0].to_string(),
            setting: String::new(),
            color_palette: String::new(),
            music: String::new(),
            sound_effects: String::new(),
            dialogue: vec![DialogueLine::default()],
            camera_angles: std::array::from_fn(|_| CAMERA_ANGLES[0].to_string()),
            duration_seconds: DEFAULT_DURATION_SECS,
            aspect_ratio: AspectRatio::default(),
        }
    }
}

impl Brief {
    /// Check invariants of a brief loaded from outside (file, history)
    pub fn validate(&self) -> Result<(), BriefError> {
        debug!(duration = self.duration_seconds, dialogue = self.dialogue.len(), "Brief::validate: called");
        if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&self.duration_seconds) {
            return Err(BriefError::DurationOutOfRange(self.duration_seconds));
        }
        if self.dialogue.is_empty() {
            return Err(BriefError::NoDialogue);
        }
        Ok(())
    }

    /// Dialogue entries worth sending to the model
    pub fn spoken_dialogue(&self) -> impl Iterator<Item = &DialogueLine> {
        self.dialogue.iter().filter(|d| !d.is_blank())
    }

    /// Set the requested duration, clamped into the supported range
    pub fn set_duration(&mut self, seconds: u32) {
        let clamped = seconds.clamp(MIN_DURATION_SECS, MAX_DURATION_SECS);
        debug!(seconds, clamped, "Brief::set_duration: called");
        self.duration_seconds = clamped;
    }

    /// Replace the camera angle of one shot (0-based index)
    pub fn set_camera_angle(&mut self, index: usize, angle: impl Into<String>) -> Result<(), BriefError> {
        debug!(index, "Brief::set_camera_angle: called");
        let slot = self
            .camera_angles
            .get_mut(index)
            .ok_or(BriefError::ShotOutOfRange { index })?;
        *slot = angle.into();
        Ok(())
    }

    /// Draw every shot's camera angle from the catalogue
    pub fn randomize_camera_angles<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        debug!("Brief::randomize_camera_angles: called");
        for slot in self.camera_angles.iter_mut() {
            if let Some(angle) = CAMERA_ANGLES.choose(rng) {
                *slot = angle.to_string();
            }
        }
    }

    /// Append an empty dialogue line
    pub fn add_dialogue_line(&mut self) {
        debug!(len = self.dialogue.len(), "Brief::add_dialogue_line: called");
        self.dialogue.push(DialogueLine::default());
    }

    /// Remove one dialogue line; removing the last one leaves a single blank line
    pub fn remove_dialogue_line(&mut self, index: usize) -> Result<(), BriefError> {
        debug!(index, len = self.dialogue.len(), "Brief::remove_dialogue_line: called");
        if index >= self.dialogue.len() {
            return Err(BriefError::DialogueOutOfRange {
                index,
                len: self.dialogue.len(),
            });
        }
        self.dialogue.remove(index);
        if self.dialogue.is_empty() {
            debug!("Brief::remove_dialogue_line: list emptied, resetting to one blank line");
            self.dialogue.push(DialogueLine::default());
        }
        Ok(())
    }
}
