//! First-class session invariants.
//!
//! Each invariant is a named property of a [`GameSession`] that must hold at
//! every observable point. They are checked on entry to every guess and,
//! in debug builds, again after the transition.

use crate::player::PlayerState;
use crate::rules::{ATTEMPTS_PER_ROUND, ROUNDS_PER_PLAYER};
use crate::session::{GameSession, Seat};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks every invariant in the set, collecting all violations.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

macro_rules! impl_invariant_set {
    ($($inv:ident),+) => {
        impl<S, $($inv),+> InvariantSet<S> for ($($inv,)+)
        where
            $($inv: Invariant<S>),+
        {
            fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
                let mut violations = Vec::new();
                $(
                    if !$inv::holds(state) {
                        violations.push(InvariantViolation::new($inv::description()));
                    }
                )+
                if violations.is_empty() {
                    Ok(())
                } else {
                    Err(violations)
                }
            }
        }
    };
}

impl_invariant_set!(I1, I2);
impl_invariant_set!(I1, I2, I3);
impl_invariant_set!(I1, I2, I3, I4);

fn both(session: &GameSession, check: impl Fn(&PlayerState) -> bool) -> bool {
    check(session.player1()) && check(session.player2())
}

/// Invariant: per-round attempts and completed rounds never exceed the
/// contract.
pub struct BoundedCountersInvariant;

impl Invariant<GameSession> for BoundedCountersInvariant {
    fn holds(session: &GameSession) -> bool {
        both(session, |p| {
            *p.attempts_this_round() <= ATTEMPTS_PER_ROUND
                && *p.rounds_completed() <= ROUNDS_PER_PLAYER
        })
    }

    fn description() -> &'static str {
        "Attempts per round and completed rounds stay within 0..=3"
    }
}

/// Invariant: one history entry per closed round, each a legal attempt count,
/// and totals agree with the history plus the open round.
pub struct HistoryConsistentInvariant;

impl Invariant<GameSession> for HistoryConsistentInvariant {
    fn holds(session: &GameSession) -> bool {
        both(session, |p| {
            let history = p.round_history();
            let closed: u32 = history.iter().map(|&n| u32::from(n)).sum();
            history.len() == usize::from(*p.rounds_completed())
                && history.iter().all(|&n| (1..=ATTEMPTS_PER_ROUND).contains(&n))
                && closed + u32::from(*p.attempts_this_round()) == *p.attempts_total()
        })
    }

    fn description() -> &'static str {
        "Round history matches completed rounds and total attempts"
    }
}

/// Invariant: the turn pointer is empty exactly when both players are
/// finished, and otherwise points at a playing player.
pub struct TurnPointerInvariant;

impl Invariant<GameSession> for TurnPointerInvariant {
    fn holds(session: &GameSession) -> bool {
        match session.active_seat() {
            None => session.is_completed(),
            Some(seat) => !session.player(seat).is_finished(),
        }
    }

    fn description() -> &'static str {
        "Turn belongs to an unfinished player, or to nobody once both are finished"
    }
}

/// Invariant: only the active player can have a running clock, and finished
/// players hold no open round.
pub struct ClockOwnershipInvariant;

impl Invariant<GameSession> for ClockOwnershipInvariant {
    fn holds(session: &GameSession) -> bool {
        [Seat::First, Seat::Second].into_iter().all(|seat| {
            let player = session.player(seat);
            let clock_ok =
                player.turn_started_at().is_none() || session.active_seat() == Some(seat);
            let open_round_ok = !player.is_finished() || *player.attempts_this_round() == 0;
            clock_ok && open_round_ok
        })
    }

    fn description() -> &'static str {
        "Only the active player's clock runs and finished players hold no open round"
    }
}

/// All session invariants as a composable set.
pub type SessionInvariants = (
    BoundedCountersInvariant,
    HistoryConsistentInvariant,
    TurnPointerInvariant,
    ClockOwnershipInvariant,
);

/// Joins violation descriptions into one message.
pub fn describe(violations: &[InvariantViolation]) -> String {
    violations
        .iter()
        .map(|v| v.description.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use chrono::{DateTime, Utc};

    fn session() -> GameSession {
        let mut random = SeededRandom::new(11);
        GameSession::create("Ana", "Luis", &mut random, DateTime::<Utc>::UNIX_EPOCH).unwrap()
    }

    #[test]
    fn test_fresh_session_holds() {
        assert!(SessionInvariants::check_all(&session()).is_ok());
    }

    #[test]
    fn test_detects_overflowing_attempts() {
        let mut s = session();
        *s.player_mut(Seat::First).counters_mut().0 = 4;
        let violations = SessionInvariants::check_all(&s).unwrap_err();
        assert!(
            violations
                .iter()
                .any(|v| v.description == BoundedCountersInvariant::description())
        );
    }

    #[test]
    fn test_detects_history_mismatch() {
        let mut s = session();
        *s.player_mut(Seat::Second).counters_mut().1 = 2;
        assert!(!HistoryConsistentInvariant::holds(&s));
    }

    #[test]
    fn test_detects_dangling_turn_pointer() {
        let mut s = session();
        s.active = None;
        assert!(!TurnPointerInvariant::holds(&s));
    }

    #[test]
    fn test_detects_foreign_clock() {
        let mut s = session();
        s.player_mut(Seat::Second)
            .start_clock(DateTime::<Utc>::UNIX_EPOCH);
        assert!(!ClockOwnershipInvariant::holds(&s));
    }

    #[test]
    fn test_two_invariants_as_set() {
        type Pair = (BoundedCountersInvariant, TurnPointerInvariant);
        assert!(Pair::check_all(&session()).is_ok());
    }

    #[test]
    fn test_describe_joins() {
        let text = describe(&[InvariantViolation::new("a"), InvariantViolation::new("b")]);
        assert_eq!(text, "a; b");
    }
}
