//! Fixed match contract.

use std::ops::RangeInclusive;

/// Smallest secret number that can be drawn.
pub const MIN_SECRET: u32 = 1;

/// Largest secret number that can be drawn.
pub const MAX_SECRET: u32 = 100;

/// Guesses a player may make before a round closes on its own.
pub const ATTEMPTS_PER_ROUND: u8 = 3;

/// Rounds each player plays unless they guess correctly first.
pub const ROUNDS_PER_PLAYER: u8 = 3;

/// The closed interval secrets are drawn from.
pub fn secret_range() -> RangeInclusive<u32> {
    MIN_SECRET..=MAX_SECRET
}
