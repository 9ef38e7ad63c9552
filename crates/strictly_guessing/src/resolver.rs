//! Winner selection once both players are finished.

use crate::messages;
use crate::player::{PlayerId, PlayerState};
use crate::session::Seat;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Which criterion decided the game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WinReason {
    /// Fewer total attempts.
    ByAttempts,
    /// Equal attempts, less accumulated turn time.
    ByTimeTiebreak,
}

/// A player's final numbers, for persistence and display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalStanding {
    /// Player's unique ID.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Seat held during the match.
    pub seat: Seat,
    /// Guesses made across the session.
    pub attempts_total: u32,
    /// Accumulated turn time.
    pub elapsed_time_ms: u64,
    /// Attempts used in each round.
    pub round_history: Vec<u8>,
    /// The number this player's opponent had to find.
    pub secret_number: u32,
    /// Whether this player found the opponent's secret.
    pub guessed_correctly: bool,
}

impl FinalStanding {
    fn from_player(seat: Seat, player: &PlayerState) -> Self {
        Self {
            id: player.id().clone(),
            name: player.name().clone(),
            seat,
            attempts_total: *player.attempts_total(),
            elapsed_time_ms: *player.elapsed_time_ms(),
            round_history: player.round_history().clone(),
            secret_number: *player.secret_number(),
            guessed_correctly: *player.has_guessed_correctly(),
        }
    }

    /// Accumulated time in whole seconds, rounded down.
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_time_ms / 1000
    }
}

/// The resolved outcome of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Winner's ID.
    pub winner_id: PlayerId,
    /// Winner's name.
    pub winner_name: String,
    /// Winning seat.
    pub winner_seat: Seat,
    /// Deciding criterion.
    pub reason: WinReason,
    /// Attempts and time were both equal; the seat policy picked the winner.
    pub dead_heat: bool,
    /// Human-readable explanation.
    pub victory_message: String,
    /// Player 1 then player 2.
    pub standings: [FinalStanding; 2],
}

impl GameResult {
    /// Returns the winner's standing.
    pub fn winner(&self) -> &FinalStanding {
        match self.winner_seat {
            Seat::First => &self.standings[0],
            Seat::Second => &self.standings[1],
        }
    }

    /// Returns the loser's standing.
    pub fn loser(&self) -> &FinalStanding {
        match self.winner_seat {
            Seat::First => &self.standings[1],
            Seat::Second => &self.standings[0],
        }
    }
}

/// Orders two players by attempts, then by time.
///
/// When both are equal the second seat wins and the third element is `true`.
pub fn pick_winner(
    first_attempts: u32,
    first_time_ms: u64,
    second_attempts: u32,
    second_time_ms: u64,
) -> (Seat, WinReason, bool) {
    if first_attempts != second_attempts {
        let seat = if first_attempts < second_attempts {
            Seat::First
        } else {
            Seat::Second
        };
        return (seat, WinReason::ByAttempts, false);
    }

    let seat = if first_time_ms < second_time_ms {
        Seat::First
    } else {
        Seat::Second
    };
    (seat, WinReason::ByTimeTiebreak, first_time_ms == second_time_ms)
}

/// Computes the final result. Callers invoke this exactly once, when both
/// players are finished.
#[instrument(skip_all, fields(player1 = %player1.id(), player2 = %player2.id()))]
pub fn resolve(player1: &PlayerState, player2: &PlayerState) -> GameResult {
    let (winner_seat, reason, dead_heat) = pick_winner(
        *player1.attempts_total(),
        *player1.elapsed_time_ms(),
        *player2.attempts_total(),
        *player2.elapsed_time_ms(),
    );

    let standings = [
        FinalStanding::from_player(Seat::First, player1),
        FinalStanding::from_player(Seat::Second, player2),
    ];
    let (winner, loser) = match winner_seat {
        Seat::First => (&standings[0], &standings[1]),
        Seat::Second => (&standings[1], &standings[0]),
    };

    let victory_message = match reason {
        WinReason::ByAttempts => {
            messages::won_by_attempts(&winner.name, winner.attempts_total, loser.attempts_total)
        }
        WinReason::ByTimeTiebreak => messages::won_by_time(&winner.name),
    };

    let winner_id = winner.id.clone();
    let winner_name = winner.name.clone();
    info!(winner = %winner_name, %reason, dead_heat, "Game resolved");

    GameResult {
        winner_id,
        winner_name,
        winner_seat,
        reason,
        dead_heat,
        victory_message,
        standings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fewer_attempts_wins_regardless_of_time() {
        let (seat, reason, dead_heat) = pick_winner(5, 90_000, 7, 1_000);
        assert_eq!(seat, Seat::First);
        assert_eq!(reason, WinReason::ByAttempts);
        assert!(!dead_heat);

        let (seat, _, _) = pick_winner(8, 0, 4, 50_000);
        assert_eq!(seat, Seat::Second);
    }

    #[test]
    fn test_time_breaks_attempt_tie() {
        let (seat, reason, dead_heat) = pick_winner(9, 12_000, 9, 15_500);
        assert_eq!(seat, Seat::First);
        assert_eq!(reason, WinReason::ByTimeTiebreak);
        assert!(!dead_heat);

        let (seat, _, _) = pick_winner(9, 20_000, 9, 15_500);
        assert_eq!(seat, Seat::Second);
    }

    #[test]
    fn test_dead_heat_goes_to_second_seat() {
        let (seat, reason, dead_heat) = pick_winner(6, 10_000, 6, 10_000);
        assert_eq!(seat, Seat::Second);
        assert_eq!(reason, WinReason::ByTimeTiebreak);
        assert!(dead_heat);
    }

    #[test]
    fn test_reason_tags() {
        assert_eq!(WinReason::ByAttempts.to_string(), "by-attempts");
        assert_eq!(WinReason::ByTimeTiebreak.as_ref(), "by-time-tiebreak");
    }

    #[test]
    fn test_elapsed_seconds_round_down() {
        let standing = FinalStanding {
            id: "p".to_string(),
            name: "Ana".to_string(),
            seat: Seat::First,
            attempts_total: 3,
            elapsed_time_ms: 12_999,
            round_history: vec![3],
            secret_number: 40,
            guessed_correctly: false,
        };
        assert_eq!(standing.elapsed_seconds(), 12);
    }
}
