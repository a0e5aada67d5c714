//! Stable, language-independent error kinds for the engine.
//!
//! Every fallible engine operation returns `Result<T, EngineError>`. The
//! dispatcher (see [`crate::dispatch`]) is the only place these are allowed
//! to surface to a caller: they're always flattened into a failed
//! acknowledgement, never propagated as a dropped message.

use thiserror::Error;

use crate::identity::UserId;

/// Errors that can occur while dispatching or executing a command.
///
/// Variant names double as the wire-level `error` string via [`EngineError::kind`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("lobby or card or player not found")]
    NotFound,

    #[error("not authorized")]
    NotAuthorized,

    #[error("not your turn, waiting on {expected}")]
    NotYourTurn { expected: UserId },

    #[error("invalid action: {reason}")]
    InvalidAction { reason: String },

    #[error("{user} already has an active lobby")]
    AlreadyInLobby { user: UserId },

    #[error("lobby is full (max {max} players)")]
    Capacity { max: usize },

    #[error("action requires phase {expected}, lobby is in {actual}")]
    PhaseViolation { expected: String, actual: String },

    #[error("transient failure: {reason}")]
    Transient { reason: String },

    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl EngineError {
    /// Stable snake_case error kind for the wire protocol (`ack.error`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::NotAuthorized => "not_authorized",
            Self::NotYourTurn { .. } => "not_your_turn",
            Self::InvalidAction { .. } => "invalid_action",
            Self::AlreadyInLobby { .. } => "already_in_lobby",
            Self::Capacity { .. } => "capacity",
            Self::PhaseViolation { .. } => "phase_violation",
            Self::Transient { .. } => "transient",
            Self::Internal { .. } => "internal",
        }
    }

    #[must_use]
    pub fn invalid_action(reason: impl Into<String>) -> Self {
        Self::InvalidAction {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn phase_violation(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::PhaseViolation {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_stable_snake_case() {
        assert_eq!(EngineError::NotFound.kind(), "not_found");
        assert_eq!(
            EngineError::Capacity { max: 6 }.kind(),
            "capacity"
        );
    }
}
