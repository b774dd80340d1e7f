use std::sync::Arc;

use buzzboard_back::config::AppConfig;
use buzzboard_back::dao::ledger::{JsonFileLedger, ScoreLedger};
use buzzboard_back::dao::question_bank::QuestionBank;
use buzzboard_back::dto::snapshot::SnapshotReason;
use buzzboard_back::dto::ws::{ClientIntent, ClientRole, ServerMessage};
use buzzboard_back::services::{ledger_service, session_service::handle_intent};
use buzzboard_back::state::{AppState, ClientConnection, SharedState};
use serde_json::Value;
use uuid::Uuid;

const BANK: &str = r#"{
    "categories": [
        { "name": "Math", "questions": [
            { "points": 100, "question": "2+2", "answer": "4" },
            { "points": 200, "question": "3*3", "answer": "9" }
        ]}
    ]
}"#;

fn connection(role: ClientRole) -> ClientConnection {
    ClientConnection {
        id: Uuid::new_v4(),
        role,
    }
}

async fn send(state: &SharedState, client: &ClientConnection, frame: &str) -> Option<ServerMessage> {
    let intent = ClientIntent::from_json_str(frame).expect("frame should parse");
    handle_intent(state, client, intent).await
}

/// End-to-end game flow driven through parsed wire frames.
#[tokio::test]
async fn test_full_game_flow() {
    let dir = tempfile::tempdir().unwrap();
    let roster = dir.path().join("teams.json");
    std::fs::write(
        &roster,
        r#"[{ "name": "Red", "points": 0 }, { "name": "Blue", "points": 0 }]"#,
    )
    .unwrap();
    let ledger: Arc<dyn ScoreLedger> = Arc::new(JsonFileLedger::new(roster.clone()));
    let state = AppState::new(
        AppConfig::default(),
        ledger.clone(),
        QuestionBank::from_json_str(BANK).unwrap(),
    );
    let mut broadcasts = state.hub().subscribe();

    let moderator = connection(ClientRole::Moderator);
    let red = connection(ClientRole::Buzzer);
    let blue = connection(ClientRole::Buzzer);

    // 1. Participants claim names; a second claim of the same name loses.
    match send(&state, &red, r#"{"type":"claimName","name":"Red"}"#).await {
        Some(ServerMessage::NameClaim { name, accepted }) => {
            assert_eq!(name, "Red");
            assert!(accepted);
        }
        other => panic!("Expected NameClaim, got {other:?}"),
    }
    send(&state, &blue, r#"{"type":"claimName","name":"Blue"}"#).await;
    match send(&state, &blue, r#"{"type":"claimName","name":"Red"}"#).await {
        Some(ServerMessage::NameClaim { accepted, .. }) => assert!(!accepted),
        other => panic!("Expected refused NameClaim, got {other:?}"),
    }

    // 2. Moderator opens a question from the bank.
    let reply = send(
        &state,
        &moderator,
        r#"{"type":"selectQuestion","question":{"categoryName":"Math","points":100,"prompt":"2+2","answer":"4"}}"#,
    )
    .await;
    assert!(reply.is_none());

    // 3. Buzz order is first come, first served.
    send(&state, &blue, r#"{"type":"buzz","name":"Blue"}"#).await;
    send(&state, &red, r#"{"type":"buzz","name":"Red"}"#).await;

    // 4. Reveal marks the question as played.
    send(&state, &moderator, r#"{"type":"revealAnswer"}"#).await;

    let kinds: Vec<String> = std::iter::from_fn(|| broadcasts.try_recv().ok())
        .map(|event| {
            let payload: Value = serde_json::from_str(&event.data).unwrap();
            payload["reason"]["kind"].as_str().unwrap().to_owned()
        })
        .collect();
    assert_eq!(kinds, vec!["questionSelected", "buzz", "buzz", "answerRevealed"]);

    match send(&state, &red, r#"{"type":"requestSnapshot"}"#).await {
        Some(ServerMessage::Snapshot { reason, state: snapshot }) => {
            assert_eq!(reason, SnapshotReason::Refresh);
            assert_eq!(snapshot.version, 4);
            assert_eq!(snapshot.buzz_order, vec!["Blue", "Red"]);
            assert_eq!(snapshot.played.len(), 1);
            assert_eq!(
                snapshot.question.and_then(|question| question.answer).as_deref(),
                Some("4")
            );
            assert!(!snapshot.buzzers_enabled);
        }
        other => panic!("Expected Snapshot, got {other:?}"),
    }

    // 5. Points go through the ledger file.
    let standing = ledger_service::apply_score_update(&state, "Blue".into(), 100)
        .await
        .expect("Blue is on the roster");
    assert_eq!(standing.points, 100);
    let scores = broadcasts.try_recv().expect("scoresChanged broadcast");
    let payload: Value = serde_json::from_str(&scores.data).unwrap();
    assert_eq!(payload["type"], "scoresChanged");
    let reread: Value = serde_json::from_str(&std::fs::read_to_string(&roster).unwrap()).unwrap();
    assert_eq!(reread[1]["points"], 100);

    // 6. Round reset keeps the played marks, full reset wipes them and frees names.
    send(&state, &moderator, r#"{"type":"resetRound"}"#).await;
    let played = state
        .with_session(|session| session.round().played().len())
        .await;
    assert_eq!(played, 1);

    send(&state, &moderator, r#"{"type":"fullReset"}"#).await;
    let (played, participants) = state
        .with_session(|session| (session.round().played().len(), session.registry().len()))
        .await;
    assert_eq!(played, 0);
    assert_eq!(participants, 0);

    // Ledger survives a full reset.
    let standings = ledger.standings().await.unwrap();
    assert_eq!(standings[1].points, 100);
}

#[tokio::test]
async fn test_buzzer_cannot_drive_the_round() {
    let state = AppState::new(
        AppConfig::default(),
        Arc::new(buzzboard_back::dao::ledger::MemoryLedger::default()),
        QuestionBank::default(),
    );
    let buzzer = connection(ClientRole::Buzzer);

    for frame in [
        r#"{"type":"revealAnswer"}"#,
        r#"{"type":"fullReset"}"#,
        r#"{"type":"addPoints","name":"Red","delta":100}"#,
        r#"{"type":"spinWheel"}"#,
    ] {
        match send(&state, &buzzer, frame).await {
            Some(ServerMessage::Rejected { reason, .. }) => {
                assert!(reason.contains("moderator"), "unexpected reason {reason}");
            }
            other => panic!("Expected Rejected for {frame}, got {other:?}"),
        }
    }
    assert_eq!(state.with_session(|session| session.version()).await, 0);
}
