use std::{sync::Arc, time::Duration};

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use buzzboard_back::config::AppConfig;
use buzzboard_back::dao::ledger::MemoryLedger;
use buzzboard_back::dao::question_bank::QuestionBank;
use buzzboard_back::dto::ws::{ClientIntent, ClientRole, QuestionPayload};
use buzzboard_back::routes;
use buzzboard_back::services::session_service::handle_intent;
use buzzboard_back::state::{AppState, ClientConnection, SharedState};
use futures::StreamExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

fn shared_state() -> SharedState {
    let config = AppConfig::default().with_passphrase(Some("quizmaster".into()));
    let bank = QuestionBank::from_json_str(
        r#"{ "categories": [
            { "name": "Math", "questions": [{ "points": 100, "question": "2+2", "answer": "4" }] }
        ]}"#,
    )
    .unwrap();
    AppState::new(
        config,
        Arc::new(MemoryLedger::new(["Red".to_string()])),
        bank,
    )
}

fn app() -> axum::Router {
    routes::router(shared_state())
}

/// Parse the `data:` line of one SSE frame.
fn sse_data(frame: &[u8]) -> Value {
    let text = std::str::from_utf8(frame).unwrap();
    let data = text
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .unwrap_or_else(|| panic!("no data line in frame {text:?}"));
    serde_json::from_str(data).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_healthcheck_reports_ok() {
    let response = app()
        .oneshot(Request::get("/healthcheck").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn test_board_hides_prompts_and_answers() {
    let response = app()
        .oneshot(Request::get("/board").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["categories"][0]["name"], "Math");
    assert_eq!(
        body["categories"][0]["questions"][0],
        serde_json::json!({ "points": 100, "played": false })
    );
}

#[tokio::test]
async fn test_questions_require_passphrase() {
    let response = app()
        .oneshot(Request::get("/questions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app()
        .oneshot(
            Request::get("/questions")
                .header("X-Passphrase", "quizmaster")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["categories"][0]["questions"][0]["answer"], "4");
}

#[tokio::test]
async fn test_teams_lists_standings() {
    let response = app()
        .oneshot(Request::get("/teams").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        serde_json::json!([{ "name": "Red", "points": 0 }])
    );
}

#[tokio::test]
async fn test_sse_subscriber_joining_mid_round_sees_current_question() {
    let state = shared_state();
    let moderator = ClientConnection {
        id: Uuid::new_v4(),
        role: ClientRole::Moderator,
    };
    let reply = handle_intent(
        &state,
        &moderator,
        ClientIntent::SelectQuestion {
            question: QuestionPayload {
                category_name: "Math".into(),
                points: 100,
                prompt: "2+2".into(),
                answer: "4".into(),
            },
        },
    )
    .await;
    assert!(reply.is_none());

    let response = routes::router(state.clone())
        .oneshot(Request::get("/sse/public").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let mut frames = response.into_body().into_data_stream();

    let first = tokio::time::timeout(Duration::from_secs(1), frames.next())
        .await
        .expect("initial snapshot frame")
        .unwrap()
        .unwrap();
    assert!(std::str::from_utf8(&first).unwrap().contains("event: snapshot"));
    let first = sse_data(&first);
    assert_eq!(first["reason"]["kind"], "refresh");
    assert_eq!(first["state"]["version"], 1);
    assert_eq!(first["state"]["question"]["prompt"], "2+2");
    assert!(first["state"]["question"].get("answer").is_none());

    handle_intent(&state, &moderator, ClientIntent::RevealAnswer).await;
    let next = tokio::time::timeout(Duration::from_secs(1), frames.next())
        .await
        .expect("broadcast frame")
        .unwrap()
        .unwrap();
    let next = sse_data(&next);
    assert_eq!(next["reason"]["kind"], "answerRevealed");
    assert_eq!(next["state"]["version"], 2);
    assert_eq!(next["state"]["question"]["answer"], "4");
}
