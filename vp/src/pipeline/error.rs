//! Pipeline error types

use thiserror::Error;

use crate::decode::DecodeError;
use crate::domain::Language;
use crate::llm::{ErrorKind, LlmError};

/// Failure of one compose -> execute -> decode run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Generation client error: {0}")]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Malformed(#[from] DecodeError),

    #[error("Prompt composition failed: {0}")]
    Compose(eyre::Report),
}

/// Coarse classification for callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Backend,
    Malformed,
    Internal,
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Llm(e) => match e.kind() {
                ErrorKind::Transport => FailureKind::Transport,
                ErrorKind::Backend => FailureKind::Backend,
            },
            Self::Malformed(_) => FailureKind::Malformed,
            Self::Compose(_) => FailureKind::Internal,
        }
    }

    /// Localized message safe to show the user; never contains backend text
    pub fn user_message(&self, language: Language) -> &'static str {
        let messages = language.messages();
        match self.kind() {
            FailureKind::Transport | FailureKind::Backend | FailureKind::Malformed => messages.generation_failed,
            FailureKind::Internal => messages.unknown_error,
        }
    }
}

/// Rejection of a batch refresh
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefreshError {
    #[error("A refresh of all fields is already in progress")]
    AlreadyRunning,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_result;

    #[test]
    fn test_user_message_never_leaks_raw_text() {
        let err: PipelineError = decode_result("secret model output").unwrap_err().into();
        assert_eq!(err.kind(), FailureKind::Malformed);
        for language in Language::ALL {
            let message = err.user_message(language);
            assert!(!message.contains("secret"));
            assert_eq!(message, language.messages().generation_failed);
        }
    }

    #[test]
    fn test_kind_mapping() {
        let backend: PipelineError = LlmError::Backend {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(backend.kind(), FailureKind::Backend);

        let compose = PipelineError::Compose(eyre::eyre!("bad template"));
        assert_eq!(compose.kind(), FailureKind::Internal);
        assert_eq!(compose.user_message(Language::En), Language::En.messages().unknown_error);
    }
}
