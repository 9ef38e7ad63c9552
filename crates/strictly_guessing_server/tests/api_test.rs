//! Tests for the REST routes, driven through the router without a socket.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use strictly_guessing::{GuessingEngine, ManualClock, RandomSource, SessionStore};
use strictly_guessing_server::{AppState, GameHistory, InMemoryHistory, router};
use tower::ServiceExt;

/// Player 1's secret is 25, player 2's is 75. No seat swap.
struct Scripted {
    next: usize,
}

impl RandomSource for Scripted {
    fn secret(&mut self, _min: u32, _max: u32) -> u32 {
        self.next += 1;
        if self.next % 2 == 1 { 25 } else { 75 }
    }

    fn seat_swap(&mut self) -> bool {
        false
    }
}

fn app() -> (Router, Arc<InMemoryHistory>) {
    let engine = Arc::new(GuessingEngine::with_parts(
        Arc::new(SessionStore::new()),
        Arc::new(ManualClock::default()),
        Box::new(Scripted { next: 0 }),
    ));
    let history = Arc::new(InMemoryHistory::new(10));
    (router(AppState::new(engine, history.clone())), history)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Starts a game and returns (session id, player 1 id, player 2 id).
async fn start(app: &Router) -> (String, String, String) {
    let (status, body) = send(
        app,
        post(
            "/api/game/start",
            json!({"player1_name": "Ana", "player2_name": "Luis"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let session = &body["session"];
    (
        session["session_id"].as_str().unwrap().to_string(),
        session["players"][0]["id"].as_str().unwrap().to_string(),
        session["players"][1]["id"].as_str().unwrap().to_string(),
    )
}

async fn guess(app: &Router, sid: &str, player: &str, value: i64) -> (StatusCode, Value) {
    send(
        app,
        post(
            &format!("/api/game/{sid}/guess"),
            json!({"player_id": player, "guess": value}),
        ),
    )
    .await
}

#[tokio::test]
async fn test_root_greets() {
    let (app, _) = app();
    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_start_returns_snapshot_and_message() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        post(
            "/api/game/start",
            json!({"player1_name": "Ana", "player2_name": "Luis"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["message"],
        "The game has started! The secret numbers have been generated."
    );
    assert_eq!(body["session"]["session_round"], 1);
    assert_eq!(
        body["session"]["active_player_id"],
        body["session"]["players"][0]["id"]
    );
    assert!(body["session"]["players"][0].get("secret_number").is_none());
}

#[tokio::test]
async fn test_blank_name_is_bad_request() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        post(
            "/api/game/start",
            json!({"player1_name": "  ", "player2_name": "Luis"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid-input");
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let (app, _) = app();
    let (status, body) = send(&app, post("/api/game/start", json!({"player1_name": "Ana"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid-body");
}

#[tokio::test]
async fn test_guess_flow_and_errors() {
    let (app, _) = app();
    let (sid, p1, p2) = start(&app).await;

    let (status, body) = guess(&app, &sid, &p2, 25).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "not-your-turn");

    let (status, body) = guess(&app, &sid, &p1, 90).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "in-progress");
    assert_eq!(body["hint"], "too-high");
    assert_eq!(body["message"], "Too high. Try a lower number.");

    let (status, body) = guess(&app, &sid, &p1, -5).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hint"], "too-low");
    assert_eq!(body["players"][0]["attempts_this_round"], 2);

    let (status, body) = guess(&app, &sid, "nobody", 50).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "player-not-found");

    let (status, body) = guess(&app, "missing", &p1, 50).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "session-not-found");
}

#[tokio::test]
async fn test_snapshot_route() {
    let (app, _) = app();
    let (sid, p1, _) = start(&app).await;
    guess(&app, &sid, &p1, 10).await;

    let (status, body) = send(&app, get(&format!("/api/game/{sid}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["players"][0]["attempts_this_round"], 1);
}

#[tokio::test]
async fn test_completed_game_is_recorded() {
    let (app, history) = app();
    let (sid, p1, p2) = start(&app).await;

    guess(&app, &sid, &p1, 75).await;
    guess(&app, &sid, &p2, 10).await;
    let (status, body) = guess(&app, &sid, &p2, 25).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["result"]["winner_name"], "Ana");
    assert_eq!(body["result"]["reason"], "by-attempts");
    assert_eq!(history.len(), 1);

    let (status, _) = send(&app, get(&format!("/api/game/{sid}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, get("/api/game/history")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["session_id"], sid.as_str());
    assert_eq!(body[0]["player1_attempts"], 1);
    assert_eq!(body[0]["player2_attempts"], 2);
}
