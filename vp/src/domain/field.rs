//! Suggestible brief fields and the setter capability used to apply suggestions

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::brief::{Brief, DialogueLine};

/// A brief slot the model can suggest a value for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionField {
    Subject,
    Style,
    Setting,
    ColorPalette,
    Music,
    SoundEffects,
    Dialogue,
}

impl SuggestionField {
    /// Every field, in the order a full refresh visits them
    pub const ALL: [SuggestionField; 7] = [
        Self::Subject,
        Self::Style,
        Self::Setting,
        Self::ColorPalette,
        Self::Music,
        Self::SoundEffects,
        Self::Dialogue,
    ];

    /// Stable kebab-case name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Style => "style",
            Self::Setting => "setting",
            Self::ColorPalette => "color-palette",
            Self::Music => "music",
            Self::SoundEffects => "sound-effects",
            Self::Dialogue => "dialogue",
        }
    }

    /// True for the single structured field
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Dialogue)
    }
}

impl std::fmt::Display for SuggestionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for SuggestionField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "subject" => Ok(Self::Subject),
            "style" => Ok(Self::Style),
            "setting" => Ok(Self::Setting),
            "color-palette" | "colorpalette" | "palette" => Ok(Self::ColorPalette),
            "music" => Ok(Self::Music),
            "sound-effects" | "soundeffects" | "sfx" => Ok(Self::SoundEffects),
            "dialogue" => Ok(Self::Dialogue),
            _ => Err(format!(
                "Unknown field: {}. Use: subject, style, setting, color-palette, music, sound-effects, dialogue",
                s
            )),
        }
    }
}

/// A decoded suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestionValue {
    Text(String),
    Dialogue(Vec<DialogueLine>),
}

impl std::fmt::Display for SuggestionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{}", text),
            Self::Dialogue(lines) => {
                let rendered: Vec<String> = lines.iter().map(|d| format!("{}: \"{}\"", d.speaker, d.line)).collect();
                write!(f, "{}", rendered.join("\n"))
            }
        }
    }
}

/// Setter capability for suggestion results
///
/// `apply` ignores values whose shape does not match the field.
pub trait SuggestionSink {
    /// Current value of a field
    fn current(&self, field: SuggestionField) -> SuggestionValue;

    /// Replace a field's value
    fn apply(&mut self, field: SuggestionField, value: SuggestionValue);
}

impl Brief {
    fn text_slot(&mut self, field: SuggestionField) -> Option<&mut String> {
        match field {
            SuggestionField::Subject => Some(&mut self.subject),
            SuggestionField::Style => Some(&mut self.style),
            SuggestionField::Setting => Some(&mut self.setting),
            SuggestionField::ColorPalette => Some(&mut self.color_palette),
            SuggestionField::Music => Some(&mut self.music),
            SuggestionField::SoundEffects => Some(&mut self.sound_effects),
            SuggestionField::Dialogue => None,
        }
    }
}

impl SuggestionSink for Brief {
    fn current(&self, field: SuggestionField) -> SuggestionValue {
        match field {
            SuggestionField::Subject => SuggestionValue::Text(self.subject.clone()),
            SuggestionField::Style => SuggestionValue::Text(self.style.clone()),
            SuggestionField::Setting => SuggestionValue::Text(self.setting.clone()),
            SuggestionField::ColorPalette => SuggestionValue::Text(self.color_palette.clone()),
            SuggestionField::Music => SuggestionValue::Text(self.music.clone()),
            SuggestionField::SoundEffects => SuggestionValue::Text(self.sound_effects.clone()),
            SuggestionField::Dialogue => SuggestionValue::Dialogue(self.dialogue.clone()),
        }
    }

    fn apply(&mut self, field: SuggestionField, value: SuggestionValue) {
        match (field, value) {
            (SuggestionField::Dialogue, SuggestionValue::Dialogue(lines)) if !lines.is_empty() => {
                self.dialogue = lines;
            }
            (field, SuggestionValue::Text(text)) => {
                if let Some(slot) = self.text_slot(field) {
                    *slot = text;
                }
            }
            _ => {}
        }
    }
}

/// Brief handle shared between concurrently running tasks
///
/// Locks are held only for the duration of a read or a write.
#[derive(Debug, Clone, Default)]
pub struct SharedBrief(Arc<Mutex<Brief>>);

impl SharedBrief {
    pub fn new(brief: Brief) -> Self {
        Self(Arc::new(Mutex::new(brief)))
    }

    /// Copy of the current brief
    pub fn snapshot(&self) -> Brief {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Brief> {
        // A poisoned lock still holds a usable brief
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SuggestionSink for SharedBrief {
    fn current(&self, field: SuggestionField) -> SuggestionValue {
        self.lock().current(field)
    }

    fn apply(&mut self, field: SuggestionField, value: SuggestionValue) {
        self.lock().apply(field, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_order_is_fixed() {
        let names: Vec<&str> = SuggestionField::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec!["subject", "style", "setting", "color-palette", "music", "sound-effects", "dialogue"]
        );
    }

    #[test]
    fn test_field_parse() {
        assert_eq!("color_palette".parse::<SuggestionField>().unwrap(), SuggestionField::ColorPalette);
        assert_eq!("Sound-Effects".parse::<SuggestionField>().unwrap(), SuggestionField::SoundEffects);
        assert!("lighting".parse::<SuggestionField>().is_err());
    }

    #[test]
    fn test_apply_text_field() {
        let mut brief = Brief::default();
        brief.apply(SuggestionField::Setting, SuggestionValue::Text("Neo-Seoul at night".to_string()));
        assert_eq!(brief.setting, "Neo-Seoul at night");
        assert_eq!(
            brief.current(SuggestionField::Setting),
            SuggestionValue::Text("Neo-Seoul at night".to_string())
        );
    }

    #[test]
    fn test_apply_dialogue_field() {
        let mut brief = Brief::default();
        let lines = vec![DialogueLine::new("A", "hi"), DialogueLine::new("B", "hey")];
        brief.apply(SuggestionField::Dialogue, SuggestionValue::Dialogue(lines.clone()));
        assert_eq!(brief.dialogue, lines);
    }

    #[test]
    fn test_apply_mismatched_shape_is_ignored() {
        let mut brief = Brief::default();
        brief.apply(SuggestionField::Dialogue, SuggestionValue::Text("nope".to_string()));
        assert_eq!(brief.dialogue, vec![DialogueLine::default()]);

        brief.apply(SuggestionField::Dialogue, SuggestionValue::Dialogue(vec![]));
        assert_eq!(brief.dialogue.len(), 1);
    }

    #[test]
    fn test_shared_brief_applies_through_clones() {
        let shared = SharedBrief::new(Brief::default());
        let mut handle = shared.clone();
        handle.apply(SuggestionField::Music, SuggestionValue::Text("Lo-fi beats".to_string()));
        assert_eq!(shared.snapshot().music, "Lo-fi beats");
    }

    #[test]
    fn test_dialogue_value_display() {
        let value = SuggestionValue::Dialogue(vec![DialogueLine::new("Mina", "Ready?")]);
        assert_eq!(value.to_string(), "Mina: \"Ready?\"");
    }
}
