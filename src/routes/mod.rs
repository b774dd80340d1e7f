use axum::Router;

use crate::state::SharedState;

/// Board, question bank and standings routes.
pub mod board;
/// Swagger UI routes.
pub mod docs;
/// Health check route.
pub mod health;
/// Public SSE mirror route.
pub mod sse;
/// WebSocket upgrade route.
pub mod websocket;

/// Assemble every route tree around the shared session state.
pub fn router(state: SharedState) -> Router<()> {
    Router::new()
        .merge(health::router())
        .merge(websocket::router())
        .merge(sse::router())
        .merge(board::router(state.clone()))
        .merge(docs::router())
        .with_state(state)
}
