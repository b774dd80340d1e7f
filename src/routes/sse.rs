use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

const PUBLIC_STREAM_PATH: &str = "/sse/public";

#[utoipa::path(
    get,
    path = "/sse/public",
    tag = "sse",
    responses((status = 200, description = "Current session snapshot, then a read-only mirror of every session broadcast", content_type = "text/event-stream", body = String))
)]
/// Mirror session broadcasts for displays that cannot open a WebSocket.
pub async fn public_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(subscribers = state.hub().receiver_count(), "public SSE subscriber joined");
    sse_service::public_stream(state).await
}

/// Routes serving the read-only event mirror.
pub fn router() -> Router<SharedState> {
    Router::new().route(PUBLIC_STREAM_PATH, get(public_stream))
}
