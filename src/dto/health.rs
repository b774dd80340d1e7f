use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded" when the score ledger is unreadable).
    pub status: String,
    /// WebSocket clients currently connected.
    pub connections: usize,
    /// Names currently claimed.
    pub participants: usize,
}

impl HealthResponse {
    /// Build a response from the ledger probe and live counters.
    pub fn new(ledger_ok: bool, connections: usize, participants: usize) -> Self {
        let status = if ledger_ok { "ok" } else { "degraded" };
        Self {
            status: status.to_string(),
            connections,
            participants,
        }
    }
}
