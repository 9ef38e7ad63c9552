//! Player-facing text.

use crate::rules::ATTEMPTS_PER_ROUND;

/// Sent with the snapshot when a session starts.
pub const GAME_STARTED: &str = "The game has started! The secret numbers have been generated.";

pub(crate) fn correct(secret: u32) -> String {
    format!("Correct! You guessed the secret number ({secret}).")
}

pub(crate) const TOO_HIGH: &str = "Too high. Try a lower number.";

pub(crate) const TOO_LOW: &str = "Too low. Try a higher number.";

pub(crate) fn attempts_exhausted() -> String {
    format!(" You have used all {ATTEMPTS_PER_ROUND} attempts this round.")
}

pub(crate) fn won_by_attempts(winner: &str, best: u32, other: u32) -> String {
    format!("{winner} is the winner! Won with fewer attempts ({best} vs {other}).")
}

pub(crate) fn won_by_time(winner: &str) -> String {
    format!("{winner} is the winner! Tied on attempts, won with less total time.")
}
