//! Per-player state within a session.

use crate::clock::elapsed_ms;
use crate::rules::{ATTEMPTS_PER_ROUND, ROUNDS_PER_PLAYER};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Unique identifier for a player within a session.
pub type PlayerId = String;

/// Whether a player still has rounds to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerPhase {
    /// Rounds remain and the secret has not been found.
    Playing,
    /// Guessed correctly or closed every round. Skipped on all later turns.
    Finished,
}

/// Authoritative state of one player.
///
/// The secret stored here belongs to this player and is only ever compared
/// against the opponent's guesses.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct PlayerState {
    id: PlayerId,
    name: String,
    secret_number: u32,
    attempts_this_round: u8,
    attempts_total: u32,
    rounds_completed: u8,
    has_guessed_correctly: bool,
    elapsed_time_ms: u64,
    turn_started_at: Option<DateTime<Utc>>,
    round_history: Vec<u8>,
}

impl PlayerState {
    /// Creates a player with zeroed counters and an unset clock.
    pub(crate) fn new(id: PlayerId, name: String, secret_number: u32) -> Self {
        Self {
            id,
            name,
            secret_number,
            attempts_this_round: 0,
            attempts_total: 0,
            rounds_completed: 0,
            has_guessed_correctly: false,
            elapsed_time_ms: 0,
            turn_started_at: None,
            round_history: Vec::new(),
        }
    }

    /// Derives the phase tag. This is the only place "finished" is decided.
    pub fn phase(&self) -> PlayerPhase {
        if self.has_guessed_correctly || self.rounds_completed >= ROUNDS_PER_PLAYER {
            PlayerPhase::Finished
        } else {
            PlayerPhase::Playing
        }
    }

    /// Returns true once the player is [`PlayerPhase::Finished`].
    pub fn is_finished(&self) -> bool {
        self.phase() == PlayerPhase::Finished
    }

    /// Attempts left before the current round closes.
    pub fn attempts_remaining(&self) -> u8 {
        ATTEMPTS_PER_ROUND.saturating_sub(self.attempts_this_round)
    }

    /// Round currently being played, counted from 1.
    pub fn current_round(&self) -> u8 {
        self.rounds_completed.saturating_add(1).min(ROUNDS_PER_PLAYER)
    }

    /// Starts the turn clock unless it is already running.
    pub(crate) fn start_clock(&mut self, now: DateTime<Utc>) {
        if self.turn_started_at.is_none() {
            debug!(player_id = %self.id, %now, "Turn clock started");
            self.turn_started_at = Some(now);
        }
    }

    /// Counts one guess against the current round and the session total.
    pub(crate) fn record_attempt(&mut self) {
        self.attempts_this_round += 1;
        self.attempts_total += 1;
    }

    /// Records that this player found the opponent's secret.
    pub(crate) fn mark_correct(&mut self) {
        self.has_guessed_correctly = true;
    }

    /// Closes the current round: stops the clock, appends the round to the
    /// history and resets the per-round counter.
    #[instrument(skip(self), fields(player_id = %self.id))]
    pub(crate) fn close_round(&mut self, now: DateTime<Utc>) {
        if let Some(started) = self.turn_started_at.take() {
            self.elapsed_time_ms += elapsed_ms(started, now);
        }
        self.round_history.push(self.attempts_this_round);
        self.rounds_completed += 1;
        self.attempts_this_round = 0;
        debug!(
            rounds_completed = self.rounds_completed,
            elapsed_time_ms = self.elapsed_time_ms,
            "Round closed"
        );
    }

    /// Read-only view without the secret number.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id.clone(),
            name: self.name.clone(),
            phase: self.phase(),
            attempts_this_round: self.attempts_this_round,
            attempts_total: self.attempts_total,
            rounds_completed: self.rounds_completed,
            has_guessed_correctly: self.has_guessed_correctly,
            elapsed_time_ms: self.elapsed_time_ms,
            turn_started_at: self.turn_started_at,
            round_history: self.round_history.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn counters_mut(&mut self) -> (&mut u8, &mut u8) {
        (&mut self.attempts_this_round, &mut self.rounds_completed)
    }
}

/// Public projection of a [`PlayerState`]. The secret is withheld until the
/// game is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Player's unique ID.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Playing or finished.
    pub phase: PlayerPhase,
    /// Guesses made in the open round.
    pub attempts_this_round: u8,
    /// Guesses made across the session.
    pub attempts_total: u32,
    /// Rounds closed so far.
    pub rounds_completed: u8,
    /// Whether the opponent's secret has been found.
    pub has_guessed_correctly: bool,
    /// Accumulated turn time.
    pub elapsed_time_ms: u64,
    /// Start of the running turn, if any.
    pub turn_started_at: Option<DateTime<Utc>>,
    /// Attempts used in each closed round.
    pub round_history: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn player() -> PlayerState {
        PlayerState::new("p1".to_string(), "Ana".to_string(), 50)
    }

    #[test]
    fn test_new_player_is_playing() {
        let p = player();
        assert_eq!(p.phase(), PlayerPhase::Playing);
        assert_eq!(p.attempts_remaining(), 3);
        assert_eq!(p.current_round(), 1);
        assert!(p.turn_started_at().is_none());
    }

    #[test]
    fn test_close_round_accumulates_time() {
        let mut p = player();
        let t0 = DateTime::<Utc>::UNIX_EPOCH;
        p.start_clock(t0);
        p.record_attempt();
        p.record_attempt();
        p.close_round(t0 + Duration::milliseconds(2_500));

        assert_eq!(*p.elapsed_time_ms(), 2_500);
        assert_eq!(*p.attempts_this_round(), 0);
        assert_eq!(*p.attempts_total(), 2);
        assert_eq!(*p.rounds_completed(), 1);
        assert_eq!(p.round_history(), &vec![2]);
        assert!(p.turn_started_at().is_none());
    }

    #[test]
    fn test_start_clock_keeps_first_stamp() {
        let mut p = player();
        let t0 = DateTime::<Utc>::UNIX_EPOCH;
        p.start_clock(t0);
        p.start_clock(t0 + Duration::seconds(5));
        assert_eq!(*p.turn_started_at(), Some(t0));
    }

    #[test]
    fn test_correct_guess_finishes() {
        let mut p = player();
        p.record_attempt();
        p.mark_correct();
        assert_eq!(p.phase(), PlayerPhase::Finished);
    }

    #[test]
    fn test_three_rounds_finish() {
        let mut p = player();
        let t0 = DateTime::<Utc>::UNIX_EPOCH;
        for _ in 0..3 {
            for _ in 0..3 {
                p.record_attempt();
            }
            p.close_round(t0);
        }
        assert!(p.is_finished());
        assert_eq!(*p.attempts_total(), 9);
        assert_eq!(p.round_history(), &vec![3, 3, 3]);
    }

    #[test]
    fn test_view_hides_secret() {
        let json = serde_json::to_string(&player().view()).unwrap();
        assert!(!json.contains("secret"));
    }
}
