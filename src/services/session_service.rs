use tracing::{debug, info, warn};

use crate::{
    config::DisconnectPolicy,
    dao::question_bank::QuestionBank,
    dto::{
        snapshot::{SessionSnapshot, SnapshotReason},
        ws::{ClientIntent, ClientRole, QuestionPayload, ServerMessage},
    },
    services::{broadcast_events, ledger_service},
    state::{
        ClientConnection, SharedState,
        buzz_queue::BuzzRejected,
        question::{PlayedKey, Question},
        session::{RejectedIntent, Session, SessionCommand},
    },
};

/// Process one intent from `client`.
///
/// Mutations are applied and broadcast while the session lock is held, so every subscriber
/// observes updates in processing order. The returned message, if any, is for the sender only.
pub async fn handle_intent(
    state: &SharedState,
    client: &ClientConnection,
    intent: ClientIntent,
) -> Option<ServerMessage> {
    let intent_name = intent.name();
    if intent.requires_moderator() && client.role != ClientRole::Moderator {
        return Some(reject(
            client,
            intent_name,
            RejectedIntent::Forbidden(intent_name),
        ));
    }

    match intent {
        ClientIntent::ClaimName { name } => {
            let outcome = state.session().await.claim(&name, client.id);
            let accepted = match outcome {
                Ok(()) => {
                    info!(connection = %client.id, name = %name, "name claimed");
                    true
                }
                Err(err) => {
                    warn!(connection = %client.id, error = %err, "name claim refused");
                    false
                }
            };
            Some(ServerMessage::NameClaim { name, accepted })
        }
        ClientIntent::LeaveName { name } => {
            let mut session = state.session().await;
            if let Err(err) = authorize_holder(state, &mut session, client, &name) {
                return Some(reject(client, intent_name, err));
            }
            let released = session.release(&name);
            if released {
                info!(connection = %client.id, name = %name, "name released");
            }
            Some(ServerMessage::NameReleased { name, released })
        }
        ClientIntent::Buzz { name } => {
            let mut session = state.session().await;
            if let Err(err) = authorize_holder(state, &mut session, client, &name) {
                return Some(reject(client, intent_name, err));
            }
            apply_locked(
                state,
                &mut session,
                client,
                intent_name,
                SessionCommand::Buzz { name },
            )
        }
        ClientIntent::SelectQuestion { question } => {
            match resolve_question(state.questions(), question) {
                Ok(question) => {
                    apply_and_broadcast(
                        state,
                        client,
                        intent_name,
                        SessionCommand::SelectQuestion(question),
                    )
                    .await
                }
                Err(err) => Some(reject(client, intent_name, err)),
            }
        }
        ClientIntent::RevealAnswer => {
            apply_and_broadcast(state, client, intent_name, SessionCommand::Reveal).await
        }
        ClientIntent::ResetRound => {
            apply_and_broadcast(state, client, intent_name, SessionCommand::ResetRound).await
        }
        ClientIntent::FullReset => {
            apply_and_broadcast(state, client, intent_name, SessionCommand::FullReset).await
        }
        ClientIntent::AddPoints { name, delta } => {
            ledger_service::spawn_score_update(state.clone(), name, delta);
            None
        }
        ClientIntent::RequestSnapshot => Some(snapshot_message(state, SnapshotReason::Refresh).await),
        ClientIntent::ShowPrompt => {
            apply_and_broadcast(state, client, intent_name, SessionCommand::ShowPrompt).await
        }
        ClientIntent::AdvanceBuzz => {
            apply_and_broadcast(state, client, intent_name, SessionCommand::AdvanceBuzz).await
        }
        ClientIntent::ResetBuzzer => {
            apply_and_broadcast(state, client, intent_name, SessionCommand::ResetBuzzer).await
        }
        ClientIntent::SetWheel { kind } => {
            apply_and_broadcast(state, client, intent_name, SessionCommand::SetWheel(kind)).await
        }
        ClientIntent::SpinWheel => {
            apply_and_broadcast(state, client, intent_name, SessionCommand::SpinWheel).await
        }
    }
}

/// Current session snapshot wrapped for a single recipient.
pub async fn snapshot_message(state: &SharedState, reason: SnapshotReason) -> ServerMessage {
    let snapshot = state.with_session(SessionSnapshot::capture).await;
    ServerMessage::Snapshot {
        reason,
        state: snapshot,
    }
}

/// Apply the configured disconnect policy for a connection that went away.
pub async fn handle_disconnect(state: &SharedState, client: &ClientConnection) {
    match state.config().disconnect_policy() {
        DisconnectPolicy::Retain => {}
        DisconnectPolicy::Release => {
            let released = state.session().await.release_owned_by(client.id);
            if !released.is_empty() {
                info!(connection = %client.id, names = ?released, "released names of dropped connection");
            }
        }
    }
}

/// Wipe the session before the process exits. The score ledger is left untouched.
pub async fn reset_for_shutdown(state: &SharedState) {
    let mut session = state.session().await;
    match session.apply(SessionCommand::FullReset) {
        Ok(change) => {
            let snapshot = SessionSnapshot::capture(&session);
            broadcast_events::broadcast_snapshot(state, change.into(), snapshot);
            info!("session reset for shutdown");
        }
        Err(err) => warn!(error = %err, "failed to reset session on shutdown"),
    }
}

async fn apply_and_broadcast(
    state: &SharedState,
    client: &ClientConnection,
    intent: &'static str,
    command: SessionCommand,
) -> Option<ServerMessage> {
    let mut session = state.session().await;
    apply_locked(state, &mut session, client, intent, command)
}

/// Apply `command` and broadcast the result; the caller holds the session lock.
fn apply_locked(
    state: &SharedState,
    session: &mut Session,
    client: &ClientConnection,
    intent: &'static str,
    command: SessionCommand,
) -> Option<ServerMessage> {
    match session.apply(command) {
        Ok(change) => {
            debug!(connection = %client.id, intent, version = session.version(), "intent applied");
            let snapshot = SessionSnapshot::capture(session);
            broadcast_events::broadcast_snapshot(state, change.into(), snapshot);
            None
        }
        Err(err) => Some(reject(client, intent, err)),
    }
}

/// Names held by a still-connected client cannot be used by anyone else.
fn authorize_holder(
    state: &SharedState,
    session: &mut Session,
    client: &ClientConnection,
    name: &str,
) -> Result<(), RejectedIntent> {
    session.authorize_holder(name, client.id, |holder| {
        state.connections().contains_key(holder)
    })
}

/// Bank copy of the selected question when a bank is loaded, the payload itself otherwise.
fn resolve_question(
    bank: &QuestionBank,
    payload: QuestionPayload,
) -> Result<Question, RejectedIntent> {
    if bank.is_empty() {
        return Ok(payload.into());
    }
    let key = PlayedKey {
        prompt: payload.prompt,
        points: payload.points,
    };
    match bank.lookup(&key) {
        Some(question) => Ok(question.clone()),
        None => Err(RejectedIntent::UnknownQuestion {
            prompt: key.prompt,
            points: key.points,
        }),
    }
}

fn reject(client: &ClientConnection, intent: &'static str, err: RejectedIntent) -> ServerMessage {
    if matches!(err, RejectedIntent::Buzz(BuzzRejected::AlreadyQueued(_))) {
        debug!(connection = %client.id, intent, reason = %err, "duplicate buzz dropped");
    } else {
        warn!(connection = %client.id, intent, reason = %err, "intent rejected");
    }
    ServerMessage::Rejected {
        intent: intent.to_owned(),
        reason: err.to_string(),
    }
}
