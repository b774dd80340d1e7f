use serde::Serialize;

use crate::dto::ws::ServerMessage;

/// Serialized broadcast shared by every subscriber.
///
/// WebSocket relays forward `data` verbatim as a text frame; the SSE mirror also uses `event`
/// as the event name.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    /// SSE event name.
    pub event: &'static str,
    /// JSON encoding of a [`ServerMessage`].
    pub data: String,
}

impl ServerEvent {
    /// Encode `message` once for all subscribers.
    pub fn encode(event: &'static str, message: &ServerMessage) -> serde_json::Result<Self> {
        Ok(Self {
            event,
            data: encode_json(message)?,
        })
    }
}

fn encode_json<T: Serialize>(payload: &T) -> serde_json::Result<String> {
    serde_json::to_string(payload)
}
