use axum::{
    Router,
    extract::{Query, State, WebSocketUpgrade},
    response::Response,
    routing::get,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    dto::ws::ClientRole,
    error::AppError,
    services::websocket_service,
    state::SharedState,
};

/// Query parameters accepted on the WebSocket endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WsQuery {
    /// Role announced by the client; defaults to `buzzer`.
    #[serde(default)]
    pub role: ClientRole,
    /// Moderator passphrase, required for `moderator` when one is configured.
    pub passphrase: Option<String>,
}

#[utoipa::path(
    get,
    path = "/ws",
    tag = "session",
    params(WsQuery),
    responses(
        (status = 101, description = "Switching protocols to WebSocket"),
        (status = 401, description = "Invalid moderator passphrase")
    )
)]
/// Upgrade the HTTP connection into a session WebSocket.
pub async fn ws_handler(
    State(state): State<SharedState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let config = state.config();
    let role = websocket_service::authorize_role(&config, query.role, query.passphrase.as_deref())?;
    Ok(ws.on_upgrade(move |socket| websocket_service::handle_socket(state, socket, role)))
}

/// Configure the WebSocket endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/ws", get(ws_handler))
}
