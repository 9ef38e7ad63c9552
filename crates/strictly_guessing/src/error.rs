//! Engine error types.

use crate::player::PlayerId;
use crate::session::SessionId;
use serde::{Deserialize, Serialize};

/// Why a guess was refused.
///
/// Each reason carries a stable kebab-case code (`rounds-exhausted`,
/// `attempts-exhausted`, `not-your-turn`) that adapters surface verbatim.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ForbiddenReason {
    /// The player has already closed all of their rounds.
    RoundsExhausted,
    /// The player has already used every attempt of the current round.
    AttemptsExhausted,
    /// Another player holds the turn.
    NotYourTurn,
}

impl ForbiddenReason {
    /// Returns the stable reason code.
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// Returns a human-readable explanation.
    pub fn message(self) -> &'static str {
        match self {
            ForbiddenReason::RoundsExhausted => {
                "You have completed all of your rounds. Wait for the game to finish."
            }
            ForbiddenReason::AttemptsExhausted => {
                "You have already used your 3 attempts this round."
            }
            ForbiddenReason::NotYourTurn => "It is not your turn.",
        }
    }
}

/// Error returned by engine operations.
///
/// Every variant except [`EngineError::InvariantViolation`] leaves the session
/// untouched and usable.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EngineError {
    /// The session start request was malformed.
    #[display("Invalid input: {}", _0)]
    InvalidInput(#[error(not(source))] String),

    /// No live session has this id.
    #[display("Session {} not found", _0)]
    SessionNotFound(#[error(not(source))] SessionId),

    /// The session has no player with this id.
    #[display("Player {} not found", _0)]
    PlayerNotFound(#[error(not(source))] PlayerId),

    /// The guess is not allowed right now.
    #[display("Forbidden ({}): {}", _0, _0.message())]
    Forbidden(#[error(not(source))] ForbiddenReason),

    /// Session state broke an engine guarantee. Indicates a bug.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(#[error(not(source))] String),
}

impl EngineError {
    /// Returns true for the unknown-session and unknown-player variants.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::SessionNotFound(_) | EngineError::PlayerNotFound(_)
        )
    }

    /// Returns the refusal reason if this is a `Forbidden` error.
    pub fn forbidden_reason(&self) -> Option<ForbiddenReason> {
        match self {
            EngineError::Forbidden(reason) => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_are_kebab_case() {
        assert_eq!(ForbiddenReason::RoundsExhausted.code(), "rounds-exhausted");
        assert_eq!(
            ForbiddenReason::AttemptsExhausted.code(),
            "attempts-exhausted"
        );
        assert_eq!(ForbiddenReason::NotYourTurn.code(), "not-your-turn");
    }

    #[test]
    fn test_reason_code_parses_back() {
        let reason: ForbiddenReason = "not-your-turn".parse().expect("known code");
        assert_eq!(reason, ForbiddenReason::NotYourTurn);
    }

    #[test]
    fn test_reason_serializes_as_code() {
        let json = serde_json::to_string(&ForbiddenReason::AttemptsExhausted).unwrap();
        assert_eq!(json, "\"attempts-exhausted\"");
    }

    #[test]
    fn test_forbidden_display_contains_code() {
        let err = EngineError::Forbidden(ForbiddenReason::NotYourTurn);
        assert!(err.to_string().contains("not-your-turn"));
        assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::NotYourTurn));
        assert!(!err.is_not_found());
    }
}
