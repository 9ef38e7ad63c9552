//! Session lifecycle and locking.
//!
//! The map is guarded by a read-write lock held only long enough to insert,
//! look up or remove a handle. Each session sits behind its own mutex, so
//! guesses on different sessions never wait for each other while guesses on
//! the same session are serialized.
//!
//! Lock order is always session, then map. The map lock is never held while
//! acquiring a session lock.

use crate::error::EngineError;
use crate::random::RandomSource;
use crate::session::{GameSession, SessionId, SessionSnapshot};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

/// Shared, individually locked session.
pub type SessionHandle = Arc<Mutex<GameSession>>;

/// Concurrency-safe map from session ID to session.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session store");
        Self::default()
    }

    /// Creates a session for two players and stores it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if either name is blank.
    #[instrument(skip(self, random))]
    pub fn create(
        &self,
        player1_name: &str,
        player2_name: &str,
        random: &mut dyn RandomSource,
        now: DateTime<Utc>,
    ) -> Result<SessionSnapshot, EngineError> {
        let session = GameSession::create(player1_name, player2_name, random, now)?;
        self.insert(session)
    }

    /// Adds a freshly created session and returns its snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvariantViolation`] if the ID is already taken.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    pub fn insert(&self, session: GameSession) -> Result<SessionSnapshot, EngineError> {
        let snapshot = session.snapshot();
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if sessions.contains_key(session.id()) {
            warn!("Session already exists");
            return Err(EngineError::InvariantViolation(format!(
                "Session {} already exists",
                session.id()
            )));
        }

        sessions.insert(session.id().clone(), Arc::new(Mutex::new(session)));
        info!(active_sessions = sessions.len(), "Session stored");
        Ok(snapshot)
    }

    /// Looks up a session handle.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionNotFound`] if no live session has this ID.
    #[instrument(skip(self))]
    pub fn get(&self, session_id: &str) -> Result<SessionHandle, EngineError> {
        let sessions = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        sessions.get(session_id).cloned().ok_or_else(|| {
            debug!("Session not found");
            EngineError::SessionNotFound(session_id.to_string())
        })
    }

    /// Removes a session. Does nothing if it is absent.
    #[instrument(skip(self))]
    pub fn remove(&self, session_id: &str) {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id);

        if removed.is_some() {
            info!("Session evicted");
        } else {
            debug!("Session already absent");
        }
    }

    /// Runs `f` on the session while holding its lock.
    ///
    /// Closed sessions are reported as missing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionNotFound`] for unknown or closed sessions,
    /// [`EngineError::InvariantViolation`] if the session's lock is poisoned,
    /// or whatever `f` returns.
    #[instrument(skip(self, f))]
    pub fn with_session<T>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut GameSession) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let handle = self.get(session_id)?;
        let mut session = lock(&handle)?;
        if session.is_closed() {
            debug!("Session closed while waiting for its lock");
            return Err(EngineError::SessionNotFound(session_id.to_string()));
        }
        f(&mut session)
    }

    /// Snapshot of a live session.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionNotFound`] if the session is unknown.
    pub fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, EngineError> {
        self.with_session(session_id, |session| Ok(session.snapshot()))
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no session is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// IDs of all live sessions.
    #[instrument(skip(self))]
    pub fn ids(&self) -> Vec<SessionId> {
        let ids: Vec<_> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        debug!(count = ids.len(), "Listed sessions");
        ids
    }
}

fn lock(handle: &SessionHandle) -> Result<MutexGuard<'_, GameSession>, EngineError> {
    handle.lock().map_err(|_| {
        EngineError::InvariantViolation("Session lock poisoned by an earlier panic".to_string())
    })
}
