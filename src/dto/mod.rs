//! Wire shapes exchanged with WebSocket, SSE and REST clients.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Board, question bank and standings views.
pub mod board;
/// Health check payload.
pub mod health;
/// Client-facing round phase.
pub mod phase;
/// Broadcast session snapshots.
pub mod snapshot;
/// Pre-serialized hub events.
pub mod sse;
pub mod validation;
/// WebSocket intents and server messages.
pub mod ws;

/// Current UTC time as RFC 3339, stamped on every snapshot.
fn rfc3339_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
