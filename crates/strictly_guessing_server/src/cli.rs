//! Command-line interface for strictly_guessing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Guessing - two-player number guessing game
#[derive(Parser, Debug)]
#[command(name = "strictly_guessing")]
#[command(about = "Two-player number guessing game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long, env = "STRICTLY_GUESSING_CONFIG")]
        config: Option<PathBuf>,

        /// Host to bind to (overrides the config file)
        #[arg(long, env = "STRICTLY_GUESSING_HOST")]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long, env = "STRICTLY_GUESSING_PORT")]
        port: Option<u16>,
    },

    /// Play a match in this terminal
    Play {
        /// First player's name
        #[arg(long)]
        player1: String,

        /// Second player's name
        #[arg(long)]
        player2: String,

        /// Seed for reproducible secrets and seating
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["strictly_guessing", "serve", "--port", "8080"]);
        match cli.command {
            Command::Serve { port, .. } => assert_eq!(port, Some(8080)),
            Command::Play { .. } => panic!("Expected serve"),
        }
    }

    #[test]
    fn test_parse_play() {
        let cli = Cli::parse_from([
            "strictly_guessing",
            "play",
            "--player1",
            "Ana",
            "--player2",
            "Luis",
            "--seed",
            "7",
        ]);
        match cli.command {
            Command::Play {
                player1,
                player2,
                seed,
            } => {
                assert_eq!(player1, "Ana");
                assert_eq!(player2, "Luis");
                assert_eq!(seed, Some(7));
            }
            Command::Serve { .. } => panic!("Expected play"),
        }
    }

    #[test]
    fn test_play_requires_names() {
        assert!(Cli::try_parse_from(["strictly_guessing", "play", "--player1", "Ana"]).is_err());
    }
}
