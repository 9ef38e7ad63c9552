//! Strictly Guessing server - adapters around the guessing engine
//!
//! - **api**: axum REST routes and error mapping
//! - **history**: completed-game ledger
//! - **config**: TOML file plus command-line overrides
//! - **play**: interactive terminal match

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod cli;
mod config;
mod history;
mod play;

pub use api::{
    ApiError, AppState, ErrorBody, GuessRequest, StartRequest, StartResponse, router,
};
pub use cli::{Cli, Command};
pub use config::{ConfigError, ServerConfig};
pub use history::{GameHistory, GameRecord, InMemoryHistory};
pub use play::run_match;
