use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        mpsc,
    },
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::{
        snapshot::SnapshotReason,
        sse::ServerEvent,
        ws::{ClientIntent, ClientRole, ServerMessage},
    },
    error::ServiceError,
    services::session_service,
    state::{ClientConnection, SharedState},
};

/// Writer channel closed; the connection is going away.
#[derive(Debug, Error)]
#[error("connection closed")]
struct ConnectionClosed;

/// Check the moderator passphrase before a socket is upgraded.
pub fn authorize_role(
    config: &AppConfig,
    role: ClientRole,
    passphrase: Option<&str>,
) -> Result<ClientRole, ServiceError> {
    if role == ClientRole::Moderator && !config.passphrase_matches(passphrase) {
        return Err(ServiceError::Unauthorized(
            "invalid moderator passphrase".into(),
        ));
    }
    Ok(role)
}

/// Handle the full lifecycle of one WebSocket client.
pub async fn handle_socket(state: SharedState, socket: WebSocket, role: ClientRole) {
    let connection = ClientConnection {
        id: Uuid::new_v4(),
        role,
    };
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    // Subscribe before the welcome so no broadcast falls between it and a refresh request.
    let broadcasts = state.hub().subscribe();
    state.connections().insert(connection.id, connection);
    info!(connection = %connection.id, role = ?role, "client connected");

    let welcome = ServerMessage::Welcome {
        connection_id: connection.id,
        role,
    };
    if send_message_to_websocket(&outbound_tx, &welcome).is_err() {
        disconnect(&state, &connection).await;
        finalize(writer_task, outbound_tx).await;
        return;
    }

    let relay_task = tokio::spawn(relay_broadcasts(
        state.clone(),
        broadcasts,
        outbound_tx.clone(),
    ));

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                debug!(connection = %connection.id, payload = %text.as_str(), "received client frame");
                let reply = match ClientIntent::from_json_str(text.as_str()) {
                    Ok(intent) => session_service::handle_intent(&state, &connection, intent).await,
                    Err(err) => {
                        warn!(connection = %connection.id, error = %err, "failed to parse or validate client frame");
                        Some(ServerMessage::Rejected {
                            intent: "unknown".into(),
                            reason: err.to_string(),
                        })
                    }
                };
                if let Some(reply) = reply {
                    if send_message_to_websocket(&outbound_tx, &reply).is_err() {
                        break;
                    }
                }
            }
            Ok(Message::Close(frame)) => {
                info!(connection = %connection.id, "client closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            // pings are answered by the protocol layer
            Ok(Message::Binary(_) | Message::Ping(_) | Message::Pong(_)) => {}
            Err(err) => {
                warn!(connection = %connection.id, error = %err, "websocket error");
                break;
            }
        }
    }

    relay_task.abort();
    let _ = relay_task.await;
    disconnect(&state, &connection).await;
    finalize(writer_task, outbound_tx).await;
}

/// Forward hub broadcasts to one client. A lagging client gets a fresh snapshot instead of
/// the updates it missed.
async fn relay_broadcasts(
    state: SharedState,
    mut receiver: broadcast::Receiver<ServerEvent>,
    tx: mpsc::UnboundedSender<Message>,
) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                if tx.send(Message::Text(event.data.into())).is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "client lagged behind broadcasts; resending snapshot");
                let message = session_service::snapshot_message(&state, SnapshotReason::Refresh).await;
                if send_message_to_websocket(&tx, &message).is_err() {
                    break;
                }
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Serialize a payload and push it onto the provided WebSocket sender.
///
/// Serialization failures are logged and swallowed; only a closed writer is reported.
fn send_message_to_websocket<T>(
    tx: &mpsc::UnboundedSender<Message>,
    value: &T,
) -> Result<(), ConnectionClosed>
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{value:?}`");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| ConnectionClosed)
}

async fn disconnect(state: &SharedState, connection: &ClientConnection) {
    state.connections().remove(&connection.id);
    session_service::handle_disconnect(state, connection).await;
    info!(connection = %connection.id, "client disconnected");
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
