//! Entropy for secret numbers and seating.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

/// Source of the two random decisions a session needs.
///
/// Draws are independent: both players may end up with the same secret.
pub trait RandomSource: Send {
    /// Draws an integer uniformly from the closed interval `[min, max]`.
    fn secret(&mut self, min: u32, max: u32) -> u32;

    /// Flips a fair coin. `true` swaps the seating of the supplied names.
    fn seat_swap(&mut self) -> bool;
}

fn ordered(min: u32, max: u32) -> (u32, u32) {
    if min <= max { (min, max) } else { (max, min) }
}

/// Randomness from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    #[instrument(skip(self))]
    fn secret(&mut self, min: u32, max: u32) -> u32 {
        let (lo, hi) = ordered(min, max);
        rand::rng().random_range(lo..=hi)
    }

    fn seat_swap(&mut self) -> bool {
        rand::rng().random_bool(0.5)
    }
}

/// Reproducible randomness from a seeded generator.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Creates a generator that yields the same sequence for the same seed.
    #[instrument]
    pub fn new(seed: u64) -> Self {
        debug!(seed, "Seeding random source");
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn secret(&mut self, min: u32, max: u32) -> u32 {
        let (lo, hi) = ordered(min, max);
        self.rng.random_range(lo..=hi)
    }

    fn seat_swap(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{MAX_SECRET, MIN_SECRET};

    #[test]
    fn test_secrets_stay_in_range() {
        let mut source = ThreadRandom;
        for _ in 0..2_000 {
            let n = source.secret(MIN_SECRET, MAX_SECRET);
            assert!((MIN_SECRET..=MAX_SECRET).contains(&n), "{n} out of range");
        }
    }

    #[test]
    fn test_degenerate_interval() {
        let mut source = SeededRandom::new(7);
        assert_eq!(source.secret(42, 42), 42);
    }

    #[test]
    fn test_reversed_bounds_are_tolerated() {
        let mut source = SeededRandom::new(7);
        let n = source.secret(10, 1);
        assert!((1..=10).contains(&n));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededRandom::new(99);
        let mut b = SeededRandom::new(99);
        for _ in 0..50 {
            assert_eq!(a.secret(1, 100), b.secret(1, 100));
            assert_eq!(a.seat_swap(), b.seat_swap());
        }
    }

    #[test]
    fn test_seat_swap_takes_both_values() {
        let mut source = SeededRandom::new(3);
        let flips: Vec<bool> = (0..200).map(|_| source.seat_swap()).collect();
        assert!(flips.contains(&true));
        assert!(flips.contains(&false));
    }
}
