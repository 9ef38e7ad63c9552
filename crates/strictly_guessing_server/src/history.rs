//! Ledger of completed games.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};
use strictly_guessing::{GameResult, SessionId, WinReason};
use tracing::{debug, info, instrument};

/// One finished game.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameRecord {
    session_id: SessionId,
    player1_name: String,
    player2_name: String,
    winner_name: String,
    player1_attempts: u32,
    player2_attempts: u32,
    /// Whole seconds, rounded down.
    player1_time_seconds: u64,
    /// Whole seconds, rounded down.
    player2_time_seconds: u64,
    reason: WinReason,
    completed_at: DateTime<Utc>,
}

impl GameRecord {
    /// Builds a record from a resolved game.
    #[instrument(skip(result), fields(winner = %result.winner_name))]
    pub fn from_result(
        session_id: impl Into<SessionId> + Debug,
        result: &GameResult,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let [first, second] = &result.standings;
        Self {
            session_id: session_id.into(),
            player1_name: first.name.clone(),
            player2_name: second.name.clone(),
            winner_name: result.winner().name.clone(),
            player1_attempts: first.attempts_total,
            player2_attempts: second.attempts_total,
            player1_time_seconds: first.elapsed_seconds(),
            player2_time_seconds: second.elapsed_seconds(),
            reason: result.reason,
            completed_at,
        }
    }
}

/// Storage for completed games.
pub trait GameHistory: Send + Sync + Debug {
    /// Appends a record.
    fn record(&self, record: GameRecord);

    /// All retained records, newest first.
    fn list(&self) -> Vec<GameRecord>;

    /// Number of retained records.
    fn len(&self) -> usize;

    /// Returns true if nothing has been recorded.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounded in-memory ledger. The oldest record is dropped once the limit is
/// reached.
#[derive(Debug)]
pub struct InMemoryHistory {
    limit: usize,
    records: Mutex<VecDeque<GameRecord>>,
}

impl InMemoryHistory {
    /// Creates a ledger holding at most `limit` records.
    #[instrument]
    pub fn new(limit: usize) -> Self {
        info!("Creating in-memory game history");
        Self {
            limit: limit.max(1),
            records: Mutex::new(VecDeque::new()),
        }
    }

    /// Maximum number of records kept.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl GameHistory for InMemoryHistory {
    #[instrument(skip(self, record), fields(session_id = %record.session_id))]
    fn record(&self, record: GameRecord) {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        while records.len() >= self.limit {
            if let Some(dropped) = records.pop_front() {
                debug!(session_id = %dropped.session_id, "Dropping oldest record");
            }
        }
        records.push_back(record);
        info!(retained = records.len(), "Game recorded");
    }

    fn list(&self) -> Vec<GameRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
