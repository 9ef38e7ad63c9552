//! The authoritative state of one match.

use crate::error::EngineError;
use crate::player::{PlayerId, PlayerPhase, PlayerState, PlayerView};
use crate::random::RandomSource;
use crate::rules::secret_range;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Unique identifier for a game session.
pub type SessionId = String;

/// Seating position, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    /// Player 1. Holds the opening turn.
    First,
    /// Player 2.
    Second,
}

impl Seat {
    /// Returns the opposing seat.
    pub fn other(self) -> Self {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }
}

/// A two-player match.
///
/// Mutated only by the guess processor, one guess at a time, under the
/// session's lock in [`crate::SessionStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    pub(crate) id: SessionId,
    pub(crate) player1: PlayerState,
    pub(crate) player2: PlayerState,
    pub(crate) active: Option<Seat>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) closed: bool,
}

impl GameSession {
    /// Creates a session: validates names, seats the players at random,
    /// draws one independent secret per player and hands the opening turn
    /// to player 1. All clocks start unset.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if either name is blank.
    #[instrument(skip(random))]
    pub fn create(
        player1_name: &str,
        player2_name: &str,
        random: &mut dyn RandomSource,
        now: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        let first = validate_name(player1_name, "player1")?;
        let second = validate_name(player2_name, "player2")?;

        let (first, second) = if random.seat_swap() {
            debug!("Seating swapped");
            (second, first)
        } else {
            (first, second)
        };

        let range = secret_range();
        let player1 = PlayerState::new(new_id(), first, random.secret(*range.start(), *range.end()));
        let player2 =
            PlayerState::new(new_id(), second, random.secret(*range.start(), *range.end()));

        let session = Self {
            id: new_id(),
            player1,
            player2,
            active: Some(Seat::First),
            created_at: now,
            closed: false,
        };

        info!(
            session_id = %session.id,
            player1 = %session.player1.name(),
            player2 = %session.player2.name(),
            "Created game session"
        );
        Ok(session)
    }

    /// Returns the session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns player 1.
    pub fn player1(&self) -> &PlayerState {
        &self.player1
    }

    /// Returns player 2.
    pub fn player2(&self) -> &PlayerState {
        &self.player2
    }

    /// Returns the player in `seat`.
    pub fn player(&self, seat: Seat) -> &PlayerState {
        match seat {
            Seat::First => &self.player1,
            Seat::Second => &self.player2,
        }
    }

    pub(crate) fn player_mut(&mut self, seat: Seat) -> &mut PlayerState {
        match seat {
            Seat::First => &mut self.player1,
            Seat::Second => &mut self.player2,
        }
    }

    /// Finds which seat a player occupies.
    pub fn seat_of(&self, player_id: &str) -> Option<Seat> {
        if self.player1.id() == player_id {
            Some(Seat::First)
        } else if self.player2.id() == player_id {
            Some(Seat::Second)
        } else {
            None
        }
    }

    /// Seat holding the turn; `None` once both players are finished.
    pub fn active_seat(&self) -> Option<Seat> {
        self.active
    }

    /// ID of the player holding the turn.
    pub fn active_player_id(&self) -> Option<&PlayerId> {
        self.active.map(|seat| self.player(seat).id())
    }

    /// Returns true once both players are finished.
    pub fn is_completed(&self) -> bool {
        self.player1.is_finished() && self.player2.is_finished()
    }

    /// Highest round reached by either player, counted from 1.
    pub fn session_round(&self) -> u8 {
        self.player1
            .rounds_completed()
            .max(self.player2.rounds_completed())
            .saturating_add(1)
    }

    /// Reassigns the turn after a round closes, driven only by the pair of
    /// phase tags.
    pub(crate) fn hand_off(&mut self, closing: Seat) {
        self.active = match (self.player1.phase(), self.player2.phase()) {
            (PlayerPhase::Playing, PlayerPhase::Playing) => Some(closing.other()),
            (PlayerPhase::Playing, PlayerPhase::Finished) => Some(Seat::First),
            (PlayerPhase::Finished, PlayerPhase::Playing) => Some(Seat::Second),
            (PlayerPhase::Finished, PlayerPhase::Finished) => None,
        };
        debug!(session_id = %self.id, active = ?self.active, "Turn handed off");
    }

    /// Marks the session as no longer accepting guesses.
    pub(crate) fn close(&mut self) {
        self.closed = true;
    }

    /// Returns true once the session has been resolved and evicted.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Read-only copy of the observable state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            created_at: self.created_at,
            players: [self.player1.view(), self.player2.view()],
            active_player_id: self.active_player_id().cloned(),
            session_round: self.session_round(),
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn validate_name(name: &str, field: &str) -> Result<String, EngineError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{field} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Observable session state, as returned by `StartSession` and `GetSnapshot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session ID.
    pub session_id: SessionId,
    /// When the match started.
    pub created_at: DateTime<Utc>,
    /// Player 1 then player 2.
    pub players: [PlayerView; 2],
    /// Whose turn it is.
    pub active_player_id: Option<PlayerId>,
    /// Highest round reached by either player, counted from 1.
    pub session_round: u8,
}
