//! Prompt Composer
//!
//! Builds outbound instructions from typed input. Templates come from an
//! override directory when present, otherwise from the embedded defaults.
//! No network access happens here.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;
use crate::domain::{Brief, GeneratedResult, Language, SHOT_COUNT, SuggestionField};

/// Rendered in place of the dialogue block when no line is spoken
pub const NO_DIALOGUE_MARKER: &str = "none";

/// Template name for a suggestion field
pub fn suggestion_template(field: SuggestionField) -> &'static str {
    match field {
        SuggestionField::Subject => "suggest-subject",
        SuggestionField::Style => "suggest-style",
        SuggestionField::Setting => "suggest-setting",
        SuggestionField::ColorPalette => "suggest-color-palette",
        SuggestionField::Music => "suggest-music",
        SuggestionField::SoundEffects => "suggest-sound-effects",
        SuggestionField::Dialogue => "suggest-dialogue",
    }
}

/// Render spoken dialogue as `speaker: "line"` lines, or the none marker
pub fn render_dialogue(brief: &Brief) -> String {
    let lines: Vec<String> = brief
        .spoken_dialogue()
        .map(|d| format!("{}: \"{}\"", d.speaker, d.line))
        .collect();

    if lines.is_empty() {
        NO_DIALOGUE_MARKER.to_string()
    } else {
        lines.join("\n")
    }
}

/// Context for the full-brief template
#[derive(Debug, Clone, Serialize)]
struct BriefContext<'a> {
    language: &'static str,
    subject: &'a str,
    style: &'a str,
    setting: &'a str,
    color_palette: &'a str,
    music: &'a str,
    sound_effects: &'a str,
    dialogue: String,
    duration_seconds: u32,
    aspect_ratio: &'static str,
    shot_count: usize,
    camera_angles: String,
}

/// Context for suggestion templates
#[derive(Debug, Clone, Serialize)]
struct SuggestionContext {
    language: &'static str,
}

/// Context for the translation template
#[derive(Debug, Clone, Serialize)]
struct TranslationContext<'a> {
    language: &'static str,
    aspect_ratio: &'a str,
    shot_count: usize,
    result_json: String,
}

/// Loads and renders instruction templates
pub struct PromptComposer {
    /// Handlebars template engine (no HTML escaping)
    hbs: Handlebars<'static>,
    /// Override directory holding `{name}.pmt` files
    user_dir: Option<PathBuf>,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::embedded_only()
    }
}

impl PromptComposer {
    /// Create a composer that checks `dir` for overrides first
    pub fn new(dir: Option<impl AsRef<Path>>) -> Self {
        let user_dir = dir.map(|d| d.as_ref().to_path_buf()).filter(|d| d.exists());
        debug!(?user_dir, "PromptComposer::new: called");

        Self {
            hbs: Self::engine(),
            user_dir,
        }
    }

    /// Create a composer that only uses embedded templates
    pub fn embedded_only() -> Self {
        Self {
            hbs: Self::engine(),
            user_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. Override: `{dir}/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!("Loading prompt from override: {:?}", path);
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt override {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!("Using embedded prompt: {}", name);
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// Instruction for full-brief generation
    pub fn compose_brief_instruction(&self, brief: &Brief, language: Language) -> Result<String> {
        debug!(%language, subject_len = brief.subject.len(), "compose_brief_instruction: called");
        let context = BriefContext {
            language: language.prompt_name(),
            subject: &brief.subject,
            style: &brief.style,
            setting: &brief.setting,
            color_palette: &brief.color_palette,
            music: &brief.music,
            sound_effects: &brief.sound_effects,
            dialogue: render_dialogue(brief),
            duration_seconds: brief.duration_seconds,
            aspect_ratio: brief.aspect_ratio.token(),
            shot_count: SHOT_COUNT,
            camera_angles: brief.camera_angles.join(", "),
        };
        self.render("brief", &context)
    }

    /// Instruction for a single-field suggestion
    pub fn compose_suggestion_instruction(&self, field: SuggestionField, language: Language) -> Result<String> {
        debug!(%field, %language, "compose_suggestion_instruction: called");
        let context = SuggestionContext {
            language: language.prompt_name(),
        };
        self.render(suggestion_template(field), &context)
    }

    /// Instruction re-expressing an existing result in another language
    pub fn compose_translation_instruction(&self, result: &GeneratedResult, language: Language) -> Result<String> {
        debug!(%language, title = %result.title, "compose_translation_instruction: called");
        let context = TranslationContext {
            language: language.prompt_name(),
            aspect_ratio: &result.aspect_ratio,
            shot_count: result.shots.len(),
            result_json: result.to_pretty_json(),
        };
        self.render("translate", &context)
    }
}
