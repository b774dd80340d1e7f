use tracing::warn;

use crate::{
    dao::ledger::TeamStanding,
    dto::{
        snapshot::{SessionSnapshot, SnapshotReason},
        sse::ServerEvent,
        ws::ServerMessage,
    },
    state::SharedState,
};

const EVENT_SNAPSHOT: &str = "snapshot";
const EVENT_SCORES_CHANGED: &str = "scores_changed";

/// Broadcast a freshly captured session snapshot to every subscriber.
pub fn broadcast_snapshot(state: &SharedState, reason: SnapshotReason, snapshot: SessionSnapshot) {
    let message = ServerMessage::Snapshot {
        reason,
        state: snapshot,
    };
    send_event(state, EVENT_SNAPSHOT, &message);
}

/// Encode a snapshot the same way the hub does, for delivery to a single subscriber.
pub fn snapshot_event(
    reason: SnapshotReason,
    snapshot: SessionSnapshot,
) -> serde_json::Result<ServerEvent> {
    ServerEvent::encode(
        EVENT_SNAPSHOT,
        &ServerMessage::Snapshot {
            reason,
            state: snapshot,
        },
    )
}

/// Broadcast a score change confirmed by the ledger.
pub fn broadcast_scores_changed(state: &SharedState, standing: TeamStanding) {
    let message = ServerMessage::ScoresChanged {
        name: standing.name,
        points: standing.points,
    };
    send_event(state, EVENT_SCORES_CHANGED, &message);
}

fn send_event(state: &SharedState, event: &'static str, message: &ServerMessage) {
    match ServerEvent::encode(event, message) {
        Ok(payload) => state.hub().broadcast(payload),
        Err(err) => warn!(event, error = %err, "failed to serialize broadcast"),
    }
}
