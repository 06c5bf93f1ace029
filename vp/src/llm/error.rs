//! Generation client error types

use std::time::Duration;
use thiserror::Error;

/// Coarse failure class surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Backend unreachable
    Transport,
    /// Backend reachable but declined or errored
    Backend,
}

/// Errors that can occur during a backend call
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("API error {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Backend returned no text: {0}")]
    EmptyResponse(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl LlmError {
    /// Map into the transport/backend taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            LlmError::Transport(e) if e.is_decode() => ErrorKind::Backend,
            LlmError::Transport(_) | LlmError::Timeout(_) => ErrorKind::Transport,
            LlmError::Backend { .. } | LlmError::EmptyResponse(_) | LlmError::Config(_) => ErrorKind::Backend,
        }
    }

    /// Check if this is a transport-level failure
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}
