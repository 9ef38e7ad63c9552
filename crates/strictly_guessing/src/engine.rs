//! The three operations callers use: start, guess, snapshot.

use crate::action::Guess;
use crate::clock::{Clock, SystemClock};
use crate::error::EngineError;
use crate::guess::TurnOutcome;
use crate::random::{RandomSource, ThreadRandom};
use crate::session::SessionSnapshot;
use crate::store::SessionStore;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Entry point for adapters.
///
/// Owns nothing global: the store, clock and randomness are injected, so
/// several engines can run side by side and tests can freeze time.
pub struct GuessingEngine {
    store: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
    random: Mutex<Box<dyn RandomSource>>,
}

impl std::fmt::Debug for GuessingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuessingEngine")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl GuessingEngine {
    /// Creates an engine with a fresh store, wall-clock time and thread-local
    /// randomness.
    #[instrument]
    pub fn new() -> Self {
        Self::with_parts(
            Arc::new(SessionStore::new()),
            Arc::new(SystemClock),
            Box::new(ThreadRandom),
        )
    }

    /// Creates an engine from explicit parts.
    #[instrument(skip_all)]
    pub fn with_parts(
        store: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        info!("Creating guessing engine");
        Self {
            store,
            clock,
            random: Mutex::new(random),
        }
    }

    /// The store backing this engine.
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Starts a session between two named players.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if either name is blank.
    #[instrument(skip(self))]
    pub fn start_session(
        &self,
        player1_name: &str,
        player2_name: &str,
    ) -> Result<SessionSnapshot, EngineError> {
        let now = self.clock.now();
        let mut random = self.random.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = self
            .store
            .create(player1_name, player2_name, &mut **random, now)?;
        info!(session_id = %snapshot.session_id, "Session started");
        Ok(snapshot)
    }

    /// Submits a guess for a player.
    ///
    /// The whole read-modify-write runs under the session's lock. When the
    /// guess finishes the game the session is closed and evicted before the
    /// lock is released.
    ///
    /// # Errors
    ///
    /// [`EngineError::SessionNotFound`], [`EngineError::PlayerNotFound`],
    /// [`EngineError::Forbidden`] or [`EngineError::InvariantViolation`].
    #[instrument(skip(self))]
    pub fn submit_guess(
        &self,
        session_id: &str,
        player_id: &str,
        value: i64,
    ) -> Result<TurnOutcome, EngineError> {
        let guess = Guess::new(player_id.to_string(), value);
        let result = self.store.with_session(session_id, |session| {
            let outcome = session.apply_guess(&guess, self.clock.now())?;
            if outcome.is_completed() {
                session.close();
                self.store.remove(session_id);
            }
            Ok(outcome)
        });

        match &result {
            Ok(outcome) => debug!(%guess, hint = %outcome.hint(), "Guess accepted"),
            Err(err) => warn!(%guess, error = %err, "Guess rejected"),
        }
        result
    }

    /// Read-only snapshot of a live session.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionNotFound`] if the session is unknown or
    /// already completed.
    #[instrument(skip(self))]
    pub fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, EngineError> {
        self.store.snapshot(session_id)
    }
}

impl Default for GuessingEngine {
    fn default() -> Self {
        Self::new()
    }
}
