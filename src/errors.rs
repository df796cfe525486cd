use thiserror::Error;

/// Everything that can end or refuse a chat turn.
/// All variants carry a human-readable message for display/logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    // ── Submission rejections ────────────────────────────────────────────────
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("A reply is already streaming")]
    TurnInFlight,

    // ── Transport errors ─────────────────────────────────────────────────────
    #[error("{message}")]
    Transport { status: u16, message: String },

    #[error("No response body")]
    NoResponseBody,

    #[error("Network error: {0}")]
    Network(String),

    // ── Startup errors ───────────────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ChatError {
    pub fn transport(status: u16, message: impl Into<String>) -> Self {
        ChatError::Transport { status, message: message.into() }
    }

    pub fn network(err: impl std::fmt::Display) -> Self {
        ChatError::Network(err.to_string())
    }

    /// The submission never started a turn; nothing to roll back or report.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ChatError::EmptyMessage | ChatError::TurnInFlight)
    }
}
