//! Strictly Guessing - two-player number guessing session engine
//!
//! Each player is handed a hidden secret number and takes turns guessing the
//! opponent's. A player gets up to three rounds of up to three attempts; the
//! winner is whoever used fewer attempts in total, with accumulated turn time
//! breaking ties.
//!
//! # Architecture
//!
//! - **Random source**: secrets and seating, injectable for tests
//! - **Session store**: per-session locks behind a shared map
//! - **Game session**: the authoritative per-match state machine
//! - **Guess processor**: contract-checked state transitions
//! - **Resolver**: attempts-then-time winner selection
//!
//! # Example
//!
//! ```no_run
//! use strictly_guessing::{GuessingEngine, TurnOutcome};
//!
//! # fn example() -> Result<(), strictly_guessing::EngineError> {
//! let engine = GuessingEngine::new();
//! let snapshot = engine.start_session("Ana", "Luis")?;
//! let first = snapshot.active_player_id.clone().unwrap_or_default();
//!
//! match engine.submit_guess(&snapshot.session_id, &first, 50)? {
//!     TurnOutcome::InProgress(report) => println!("{}", report.message),
//!     TurnOutcome::Completed(report) => println!("{}", report.result.victory_message),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod action;
mod clock;
mod contracts;
mod engine;
mod error;
mod guess;
mod invariants;
mod messages;
mod player;
mod random;
mod resolver;
mod rules;
mod session;
mod store;

// Crate-level exports - Engine
pub use engine::GuessingEngine;

// Crate-level exports - Errors
pub use error::{EngineError, ForbiddenReason};

// Crate-level exports - Session state
pub use player::{PlayerId, PlayerPhase, PlayerState, PlayerView};
pub use session::{GameSession, Seat, SessionId, SessionSnapshot};
pub use store::{SessionHandle, SessionStore};

// Crate-level exports - Guess processing
pub use action::Guess;
pub use contracts::{
    AttemptsRemain, Contract, GuessContract, LegalGuess, PlayerInSession, PlayersTurn,
    RoundsRemain, SessionIsSound,
};
pub use guess::{ActivePlayer, CompletionReport, Hint, TurnOutcome, TurnReport};
pub use invariants::{
    BoundedCountersInvariant, ClockOwnershipInvariant, HistoryConsistentInvariant, Invariant,
    InvariantSet, InvariantViolation, SessionInvariants, TurnPointerInvariant,
};

// Crate-level exports - Results
pub use resolver::{FinalStanding, GameResult, WinReason, pick_winner, resolve};

// Crate-level exports - Collaborators
pub use clock::{Clock, ManualClock, SystemClock, elapsed_ms};
pub use messages::GAME_STARTED;
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use rules::{ATTEMPTS_PER_ROUND, MAX_SECRET, MIN_SECRET, ROUNDS_PER_PLAYER, secret_range};
