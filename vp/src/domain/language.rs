//! Output language selection
//!
//! The language is always passed explicitly to every composer and pipeline
//! call. Nothing in the crate infers it from rendered text.

use serde::{Deserialize, Serialize};

/// Language for generated free text and user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ko,
    En,
}

impl Language {
    /// Both supported languages
    pub const ALL: [Language; 2] = [Language::Ko, Language::En];

    /// Name used inside instructions sent to the model
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Self::Ko => "Korean",
            Self::En => "English",
        }
    }

    /// Localized user-facing messages for this language
    pub fn messages(&self) -> &'static Messages {
        match self {
            Self::Ko => &KO_MESSAGES,
            Self::En => &EN_MESSAGES,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ko => write!(f, "ko"),
            Self::En => write!(f, "en"),
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ko" | "korean" => Ok(Self::Ko),
            "en" | "english" => Ok(Self::En),
            _ => Err(format!("Unknown language: {}. Use: ko or en", s)),
        }
    }
}

/// User-facing strings surfaced by the core
#[derive(Debug)]
pub struct Messages {
    /// Shown when full-brief generation fails for any reason
    pub generation_failed: &'static str,
    /// Shown when a failure has no better description
    pub unknown_error: &'static str,
    /// Inline indicator for a failed single-field suggestion
    pub suggestion_failed: &'static str,
    /// Shown when history has no entries
    pub history_empty: &'static str,
    /// Shown after a copy to the clipboard
    pub copied: &'static str,
}

static KO_MESSAGES: Messages = Messages {
    generation_failed: "프롬프트 생성에 실패했습니다. 잠시 후 다시 시도해 주세요.",
    unknown_error: "알 수 없는 오류가 발생했습니다.",
    suggestion_failed: "추천을 가져오지 못했습니다.",
    history_empty: "저장된 기록이 없습니다.",
    copied: "복사되었습니다!",
};

static EN_MESSAGES: Messages = Messages {
    generation_failed: "Failed to generate the prompt. Please try again later.",
    unknown_error: "An unknown error occurred.",
    suggestion_failed: "Could not fetch a suggestion.",
    history_empty: "No history yet.",
    copied: "Copied!",
};
