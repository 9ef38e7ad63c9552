//! The guess processor: one legal guess in, one state transition out.

use crate::action::Guess;
use crate::contracts::{Contract, GuessContract};
use crate::error::EngineError;
use crate::messages;
use crate::player::{PlayerId, PlayerView};
use crate::resolver::{GameResult, resolve};
use crate::rules::ATTEMPTS_PER_ROUND;
use crate::session::{GameSession, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info, instrument};

/// How a guess compares to the opponent's secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Hint {
    /// The guess is the secret.
    Correct,
    /// The guess is above the secret.
    TooHigh,
    /// The guess is below the secret.
    TooLow,
}

impl Hint {
    /// Compares a guess against a secret.
    pub fn compare(guess: i64, secret: u32) -> Self {
        match guess.cmp(&i64::from(secret)) {
            Ordering::Equal => Hint::Correct,
            Ordering::Greater => Hint::TooHigh,
            Ordering::Less => Hint::TooLow,
        }
    }
}

/// The player who must guess next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePlayer {
    /// Player's unique ID.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Guesses already made in the open round.
    pub attempts_this_round: u8,
    /// Round being played, counted from 1.
    pub round: u8,
}

/// Result of a guess that left the session in play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    /// Session ID.
    pub session_id: SessionId,
    /// Comparison category.
    pub hint: Hint,
    /// Human-readable hint.
    pub message: String,
    /// The guess closed the guessing player's round.
    pub turn_closed: bool,
    /// The turn moved to a different player.
    pub turn_changed: bool,
    /// Who guesses next.
    pub active_player: ActivePlayer,
    /// Highest round reached by either player, counted from 1.
    pub session_round: u8,
    /// Player 1 then player 2.
    pub players: [PlayerView; 2],
}

/// Result of the guess that finished the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReport {
    /// Session ID.
    pub session_id: SessionId,
    /// Comparison category of the final guess.
    pub hint: Hint,
    /// Human-readable hint for the final guess.
    pub message: String,
    /// Resolved winner and final standings.
    pub result: GameResult,
}

/// Outcome of an accepted guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum TurnOutcome {
    /// The session continues.
    InProgress(TurnReport),
    /// Both players are finished; the session has been evicted.
    Completed(CompletionReport),
}

impl TurnOutcome {
    /// Comparison category of the guess.
    pub fn hint(&self) -> Hint {
        match self {
            TurnOutcome::InProgress(report) => report.hint,
            TurnOutcome::Completed(report) => report.hint,
        }
    }

    /// Human-readable hint.
    pub fn message(&self) -> &str {
        match self {
            TurnOutcome::InProgress(report) => &report.message,
            TurnOutcome::Completed(report) => &report.message,
        }
    }

    /// The final result, if this guess finished the game.
    pub fn result(&self) -> Option<&GameResult> {
        match self {
            TurnOutcome::InProgress(_) => None,
            TurnOutcome::Completed(report) => Some(&report.result),
        }
    }

    /// Returns true if the session is over.
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed(_))
    }
}

impl GameSession {
    /// Applies one guess.
    ///
    /// Rejections leave the session untouched. On completion the caller must
    /// close and evict the session while still holding its lock.
    ///
    /// # Errors
    ///
    /// [`EngineError::PlayerNotFound`], [`EngineError::Forbidden`], or
    /// [`EngineError::InvariantViolation`] if the state was already corrupt.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn apply_guess(
        &mut self,
        guess: &Guess,
        now: DateTime<Utc>,
    ) -> Result<TurnOutcome, EngineError> {
        if self.closed {
            return Err(EngineError::SessionNotFound(self.id.clone()));
        }

        let seat = GuessContract::pre(self, guess)?;

        #[cfg(debug_assertions)]
        let before = self.clone();

        let opponent_secret = *self.player(seat.other()).secret_number();
        let player = self.player_mut(seat);

        // The opening turn is never handed off, so its clock starts here.
        player.start_clock(now);
        player.record_attempt();

        let hint = Hint::compare(guess.value, opponent_secret);
        let (mut message, closes) = match hint {
            Hint::Correct => {
                player.mark_correct();
                (messages::correct(opponent_secret), true)
            }
            Hint::TooHigh => (
                messages::TOO_HIGH.to_string(),
                *player.attempts_this_round() >= ATTEMPTS_PER_ROUND,
            ),
            Hint::TooLow => (
                messages::TOO_LOW.to_string(),
                *player.attempts_this_round() >= ATTEMPTS_PER_ROUND,
            ),
        };
        if closes && hint != Hint::Correct {
            message.push_str(&messages::attempts_exhausted());
        }

        debug!(
            player_id = %guess.player_id,
            %hint,
            attempts_this_round = *player.attempts_this_round(),
            closes,
            "Guess evaluated"
        );

        if closes {
            player.close_round(now);
            self.hand_off(seat);
        }

        if let Some(active) = self.active {
            self.player_mut(active).start_clock(now);
        }

        #[cfg(debug_assertions)]
        GuessContract::post(&before, self)?;

        if self.is_completed() {
            let result = resolve(&self.player1, &self.player2);
            info!(winner = %result.winner_name, "Session completed");
            return Ok(TurnOutcome::Completed(CompletionReport {
                session_id: self.id.clone(),
                hint,
                message,
                result,
            }));
        }

        let active = self.active.ok_or_else(|| {
            EngineError::InvariantViolation("No active player in an unfinished session".into())
        })?;
        let next = self.player(active);
        let report = TurnReport {
            session_id: self.id.clone(),
            hint,
            message,
            turn_closed: closes,
            turn_changed: active != seat,
            active_player: ActivePlayer {
                id: next.id().clone(),
                name: next.name().clone(),
                attempts_this_round: *next.attempts_this_round(),
                round: next.current_round(),
            },
            session_round: self.session_round(),
            players: [self.player1.view(), self.player2.view()],
        };

        info!(
            %hint,
            turn_closed = report.turn_closed,
            next_player = %report.active_player.id,
            "Guess applied"
        );
        Ok(TurnOutcome::InProgress(report))
    }
}
