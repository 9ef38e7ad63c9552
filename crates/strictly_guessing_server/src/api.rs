//! REST surface over the guessing engine.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Greeting |
//! | POST | `/api/game/start` | Start a session |
//! | POST | `/api/game/{session_id}/guess` | Submit a guess |
//! | GET | `/api/game/{session_id}` | Session snapshot |
//! | GET | `/api/game/history` | Completed games, newest first |

use crate::history::{GameHistory, GameRecord};
use axum::{
    Json, Router,
    extract::{Path, Request, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strictly_guessing::{EngineError, GAME_STARTED, GuessingEngine, SessionSnapshot, TurnOutcome};
use tower::ServiceBuilder;
use tracing::{error, info, instrument, warn};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    engine: Arc<GuessingEngine>,
    history: Arc<dyn GameHistory>,
}

impl AppState {
    /// Bundles an engine with the ledger its completed games go to.
    pub fn new(engine: Arc<GuessingEngine>, history: Arc<dyn GameHistory>) -> Self {
        Self { engine, history }
    }
}

/// Builds the application router with request logging.
#[instrument(skip_all)]
pub fn router(state: AppState) -> Router {
    info!("Building router");
    Router::new()
        .route("/", get(handle_root))
        .route("/api/game/start", post(handle_start))
        .route("/api/game/history", get(handle_history))
        .route("/api/game/{session_id}", get(handle_snapshot))
        .route("/api/game/{session_id}/guess", post(handle_guess))
        .layer(ServiceBuilder::new().map_request(|req: Request| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}

/// Body of `POST /api/game/start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    /// First player's name.
    pub player1_name: String,
    /// Second player's name.
    pub player2_name: String,
}

/// Response to `POST /api/game/start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    /// Announcement for the players.
    pub message: String,
    /// The new session.
    pub session: SessionSnapshot,
}

/// Body of `POST /api/game/{session_id}/guess`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessRequest {
    /// Who is guessing.
    pub player_id: String,
    /// The guessed number. Negative values are valid and read as too low.
    pub guess: i64,
}

/// JSON error body: `{code, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable, kebab-case error code.
    pub code: String,
    /// Human-readable explanation.
    pub message: String,
}

/// An error ready to be sent to the client.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::InvalidInput(_) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid-input", err.to_string())
            }
            EngineError::SessionNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "session-not-found", err.to_string())
            }
            EngineError::PlayerNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "player-not-found", err.to_string())
            }
            EngineError::Forbidden(reason) => {
                Self::new(StatusCode::FORBIDDEN, reason.code(), reason.message())
            }
            EngineError::InvariantViolation(_) => {
                error!(error = %err, "Engine invariant violated");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "invariant-violation",
                    err.to_string(),
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid-body", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, code = %self.body.code, "Request failed");
        (self.status, Json(self.body)).into_response()
    }
}

async fn handle_root() -> &'static str {
    "Number guessing game API"
}

#[instrument(skip_all)]
async fn handle_start(
    State(state): State<AppState>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StartResponse>), ApiError> {
    let Json(request) = payload?;
    let session = state
        .engine
        .start_session(&request.player1_name, &request.player2_name)?;
    info!(session_id = %session.session_id, "Game started");
    Ok((
        StatusCode::CREATED,
        Json(StartResponse {
            message: GAME_STARTED.to_string(),
            session,
        }),
    ))
}

#[instrument(skip(state, payload))]
async fn handle_guess(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<GuessRequest>, JsonRejection>,
) -> Result<Json<TurnOutcome>, ApiError> {
    let Json(request) = payload?;
    let outcome = state
        .engine
        .submit_guess(&session_id, &request.player_id, request.guess)?;

    if let Some(result) = outcome.result() {
        state
            .history
            .record(GameRecord::from_result(session_id.as_str(), result, Utc::now()));
    }
    Ok(Json(outcome))
}

#[instrument(skip(state))]
async fn handle_snapshot(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    Ok(Json(state.engine.snapshot(&session_id)?))
}

async fn handle_history(State(state): State<AppState>) -> Json<Vec<GameRecord>> {
    Json(state.history.list())
}
