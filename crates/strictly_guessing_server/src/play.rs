//! Interactive terminal match.
//!
//! Reads guesses line by line and prints the engine's hints. Works on any
//! reader and writer so a match can be scripted.

use anyhow::Result;
use std::io::{BufRead, Write};
use strictly_guessing::{
    ATTEMPTS_PER_ROUND, GAME_STARTED, GameResult, GuessingEngine, MAX_SECRET, MIN_SECRET,
    TurnOutcome,
};
use tracing::{debug, info, instrument, warn};

/// Whose turn it is, as shown in the prompt.
struct Prompt {
    id: String,
    name: String,
    round: u8,
    attempt: u8,
}

/// Plays one match to completion.
///
/// Returns `None` if input ends before the game does.
///
/// # Errors
///
/// Returns an error if the engine rejects the session or the output cannot be
/// written.
#[instrument(skip(engine, input, output))]
pub fn run_match<R: BufRead, W: Write>(
    engine: &GuessingEngine,
    player1: &str,
    player2: &str,
    mut input: R,
    mut output: W,
) -> Result<Option<GameResult>> {
    let snapshot = engine.start_session(player1, player2)?;
    let session_id = snapshot.session_id.clone();
    let first = &snapshot.players[0];

    writeln!(output, "{}", GAME_STARTED)?;
    writeln!(output, "{} goes first.", first.name)?;

    let mut prompt = Prompt {
        id: first.id.clone(),
        name: first.name.clone(),
        round: 1,
        attempt: 1,
    };

    let mut line = String::new();
    loop {
        write!(
            output,
            "{} (round {}, attempt {}/{}), guess a number between {} and {}: ",
            prompt.name, prompt.round, prompt.attempt, ATTEMPTS_PER_ROUND, MIN_SECRET, MAX_SECRET
        )?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            info!(%session_id, "Input closed before the game finished");
            engine.store().remove(&session_id);
            writeln!(output)?;
            return Ok(None);
        }

        let Ok(value) = line.trim().parse::<i64>() else {
            debug!(input = %line.trim(), "Unparseable guess");
            writeln!(output, "Please enter a whole number.")?;
            continue;
        };

        let outcome = match engine.submit_guess(&session_id, &prompt.id, value) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "Guess rejected");
                writeln!(output, "{}", err)?;
                continue;
            }
        };
        writeln!(output, "{}", outcome.message())?;

        match outcome {
            TurnOutcome::InProgress(report) => {
                let next = report.active_player;
                if report.turn_changed {
                    writeln!(output, "Now it's {}'s turn.", next.name)?;
                }
                prompt = Prompt {
                    id: next.id,
                    name: next.name,
                    round: next.round,
                    attempt: next.attempts_this_round + 1,
                };
            }
            TurnOutcome::Completed(report) => {
                let result = report.result;
                writeln!(output, "{}", result.victory_message)?;
                for (label, standing) in [("Winner", result.winner()), ("Runner-up", result.loser())]
                {
                    writeln!(
                        output,
                        "  {label}: {}, {} attempts, {} s, secret was {}",
                        standing.name,
                        standing.attempts_total,
                        standing.elapsed_seconds(),
                        standing.secret_number
                    )?;
                }
                return Ok(Some(result));
            }
        }
    }
}
