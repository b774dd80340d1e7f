use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt, future, stream};
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};
use tracing::{debug, warn};

use crate::{
    dto::{
        snapshot::{SessionSnapshot, SnapshotReason},
        sse::ServerEvent,
    },
    services::broadcast_events,
    state::SharedState,
};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Mirror every hub broadcast as a server-sent event until the client goes away.
///
/// The stream opens with a `refresh` snapshot of the current session, then follows the hub.
/// Subscription and capture happen under the session lock, so no broadcast is missed or
/// repeated between the two. A subscriber that falls behind skips the missed events.
pub async fn public_stream(
    state: SharedState,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (receiver, snapshot) = {
        let session = state.session().await;
        (state.hub().subscribe(), SessionSnapshot::capture(&session))
    };

    let initial = match broadcast_events::snapshot_event(SnapshotReason::Refresh, snapshot) {
        Ok(payload) => Some(Ok(to_event(payload))),
        Err(err) => {
            warn!(error = %err, "failed to encode initial SSE snapshot");
            None
        }
    };

    let updates = BroadcastStream::new(receiver).filter_map(|item| {
        future::ready(match item {
            Ok(payload) => Some(Ok::<_, Infallible>(to_event(payload))),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                debug!(skipped, "public SSE subscriber lagged");
                None
            }
        })
    });

    Sse::new(stream::iter(initial).chain(updates)).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}

fn to_event(payload: ServerEvent) -> Event {
    Event::default().event(payload.event).data(payload.data)
}
