//! Guesses as first-class values.

use crate::player::PlayerId;
use serde::{Deserialize, Serialize};

/// A player's claim about the opponent's secret number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Guess {
    /// The player submitting the guess.
    pub player_id: PlayerId,
    /// The guessed number. Any integer is accepted and compared.
    pub value: i64,
}

impl std::fmt::Display for Guess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} guesses {}", self.player_id, self.value)
    }
}
