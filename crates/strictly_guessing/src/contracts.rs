//! Contract-based validation for guesses.
//!
//! Preconditions run in the order the rules fix: resolve the player, then
//! rounds, then attempts, then turn. Postconditions compare the state before
//! and after a transition.

use crate::action::Guess;
use crate::error::{EngineError, ForbiddenReason};
use crate::invariants::{InvariantSet, SessionInvariants, describe};
use crate::rules::ROUNDS_PER_PLAYER;
use crate::session::{GameSession, Seat};
use tracing::{instrument, warn};

/// Preconditions and postconditions for a state transition.
pub trait Contract<S, A> {
    /// What a successful precondition check yields.
    type Checked;

    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<Self::Checked, EngineError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), EngineError>;
}

/// Precondition: the session's invariants hold on entry.
pub struct SessionIsSound;

impl SessionIsSound {
    /// Fails with [`EngineError::InvariantViolation`] if any invariant is broken.
    pub fn check(session: &GameSession) -> Result<(), EngineError> {
        SessionInvariants::check_all(session).map_err(|violations| {
            let message = describe(&violations);
            warn!(session_id = %session.id(), %message, "Session invariants broken");
            EngineError::InvariantViolation(message)
        })
    }
}

/// Precondition: the guessing player belongs to the session.
pub struct PlayerInSession;

impl PlayerInSession {
    /// Returns the player's seat.
    pub fn check(guess: &Guess, session: &GameSession) -> Result<Seat, EngineError> {
        session
            .seat_of(&guess.player_id)
            .ok_or_else(|| EngineError::PlayerNotFound(guess.player_id.clone()))
    }
}

/// Precondition: the player still has rounds left.
pub struct RoundsRemain;

impl RoundsRemain {
    /// Fails with `rounds-exhausted` once every round is closed.
    #[instrument(skip(session))]
    pub fn check(seat: Seat, session: &GameSession) -> Result<(), EngineError> {
        if *session.player(seat).rounds_completed() >= ROUNDS_PER_PLAYER {
            Err(EngineError::Forbidden(ForbiddenReason::RoundsExhausted))
        } else {
            Ok(())
        }
    }
}

/// Precondition: the open round still has attempts left.
pub struct AttemptsRemain;

impl AttemptsRemain {
    /// Fails with `attempts-exhausted` when the open round is used up.
    #[instrument(skip(session))]
    pub fn check(seat: Seat, session: &GameSession) -> Result<(), EngineError> {
        if session.player(seat).attempts_remaining() == 0 {
            Err(EngineError::Forbidden(ForbiddenReason::AttemptsExhausted))
        } else {
            Ok(())
        }
    }
}

/// Precondition: the player holds the turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Fails with `not-your-turn` unless `seat` holds the turn.
    #[instrument(skip(session))]
    pub fn check(seat: Seat, session: &GameSession) -> Result<(), EngineError> {
        if session.active_seat() != Some(seat) {
            Err(EngineError::Forbidden(ForbiddenReason::NotYourTurn))
        } else {
            Ok(())
        }
    }
}

/// Composite precondition for a guess.
pub struct LegalGuess;

impl LegalGuess {
    /// Validates all preconditions and returns the guessing seat.
    #[instrument(skip(session), fields(session_id = %session.id()))]
    pub fn check(guess: &Guess, session: &GameSession) -> Result<Seat, EngineError> {
        SessionIsSound::check(session)?;
        let seat = PlayerInSession::check(guess, session)?;
        RoundsRemain::check(seat, session)?;
        AttemptsRemain::check(seat, session)?;
        PlayersTurn::check(seat, session)?;
        Ok(seat)
    }
}

/// Contract for guesses.
///
/// Preconditions:
/// - Invariants hold
/// - Player belongs to the session
/// - Rounds and attempts remain
/// - It is the player's turn
///
/// Postconditions:
/// - Invariants still hold
/// - Totals, completed rounds and history never shrink
pub struct GuessContract;

impl Contract<GameSession, Guess> for GuessContract {
    type Checked = Seat;

    fn pre(session: &GameSession, guess: &Guess) -> Result<Seat, EngineError> {
        LegalGuess::check(guess, session)
    }

    fn post(before: &GameSession, after: &GameSession) -> Result<(), EngineError> {
        SessionIsSound::check(after)?;

        let monotonic = [Seat::First, Seat::Second].into_iter().all(|seat| {
            let (b, a) = (before.player(seat), after.player(seat));
            a.attempts_total() >= b.attempts_total()
                && a.rounds_completed() >= b.rounds_completed()
                && a.elapsed_time_ms() >= b.elapsed_time_ms()
                && a.round_history().starts_with(b.round_history())
                && (!b.has_guessed_correctly() || *a.has_guessed_correctly())
                && a.secret_number() == b.secret_number()
        });

        if monotonic {
            Ok(())
        } else {
            Err(EngineError::InvariantViolation(
                "Postcondition failed: player progress went backwards".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use chrono::{DateTime, Utc};

    fn session() -> GameSession {
        let mut random = SeededRandom::new(21);
        GameSession::create("Ana", "Luis", &mut random, DateTime::<Utc>::UNIX_EPOCH).unwrap()
    }

    #[test]
    fn test_active_player_passes() {
        let s = session();
        let guess = Guess::new(s.player1().id().clone(), 50);
        assert_eq!(GuessContract::pre(&s, &guess), Ok(Seat::First));
    }

    #[test]
    fn test_waiting_player_rejected() {
        let s = session();
        let guess = Guess::new(s.player2().id().clone(), 50);
        assert_eq!(
            GuessContract::pre(&s, &guess),
            Err(EngineError::Forbidden(ForbiddenReason::NotYourTurn))
        );
    }

    #[test]
    fn test_unknown_player_rejected() {
        let s = session();
        let guess = Guess::new("ghost".to_string(), 50);
        assert!(matches!(
            GuessContract::pre(&s, &guess),
            Err(EngineError::PlayerNotFound(_))
        ));
    }

    #[test]
    fn test_corrupt_state_is_fatal() {
        let mut s = session();
        *s.player_mut(Seat::First).counters_mut().0 = 4;
        let guess = Guess::new(s.player1().id().clone(), 50);
        assert!(matches!(
            GuessContract::pre(&s, &guess),
            Err(EngineError::InvariantViolation(_))
        ));
    }

    fn use_up_round(s: &mut GameSession, seat: Seat) {
        for _ in 0..3 {
            s.player_mut(seat).record_attempt();
        }
    }

    #[test]
    fn test_spent_round_rejected_without_change() {
        let mut s = session();
        use_up_round(&mut s, Seat::First);
        assert_eq!(*s.player1().attempts_this_round(), 3);
        assert_eq!(*s.player1().attempts_total(), 3);

        let before = s.clone();
        let guess = Guess::new(s.player1().id().clone(), 50);
        assert_eq!(
            s.apply_guess(&guess, DateTime::<Utc>::UNIX_EPOCH),
            Err(EngineError::Forbidden(ForbiddenReason::AttemptsExhausted))
        );
        assert_eq!(s, before);
    }

    #[test]
    fn test_attempts_checked_before_turn() {
        let mut s = session();
        use_up_round(&mut s, Seat::Second);
        let guess = Guess::new(s.player2().id().clone(), 50);
        assert_eq!(
            GuessContract::pre(&s, &guess),
            Err(EngineError::Forbidden(ForbiddenReason::AttemptsExhausted))
        );
    }

    #[test]
    fn test_rounds_checked_before_attempts_and_turn() {
        let mut s = session();
        for _ in 0..3 {
            use_up_round(&mut s, Seat::Second);
            s.player_mut(Seat::Second)
                .close_round(DateTime::<Utc>::UNIX_EPOCH);
        }
        let guess = Guess::new(s.player2().id().clone(), 50);
        assert_eq!(
            GuessContract::pre(&s, &guess),
            Err(EngineError::Forbidden(ForbiddenReason::RoundsExhausted))
        );
    }

    #[test]
    fn test_post_rejects_regression() {
        let before = session();
        let mut after = before.clone();
        after.player_mut(Seat::First).record_attempt();
        assert!(GuessContract::post(&before, &after).is_ok());
        assert!(GuessContract::post(&after, &before).is_err());
    }
}
