use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::{
    dao::ledger::{LedgerError, TeamStanding},
    dto::board::TeamSummary,
    error::ServiceError,
    services::broadcast_events,
    state::SharedState,
};

/// Run a score update in the background; the sender gets no reply.
pub fn spawn_score_update(state: SharedState, name: String, delta: i64) -> JoinHandle<()> {
    tokio::spawn(async move {
        apply_score_update(&state, name, delta).await;
    })
}

/// Forward a score update to the ledger and broadcast `scoresChanged` once it is confirmed.
///
/// Returns the updated standing, or `None` when the ledger refused the update.
pub async fn apply_score_update(
    state: &SharedState,
    name: String,
    delta: i64,
) -> Option<TeamStanding> {
    match state.ledger().add_points(name.clone(), delta).await {
        Ok(standing) => {
            info!(name = %standing.name, delta, points = standing.points, "score updated");
            broadcast_events::broadcast_scores_changed(state, standing.clone());
            Some(standing)
        }
        Err(LedgerError::UnknownParticipant(name)) => {
            warn!(name = %name, delta, "score update skipped: unknown participant");
            None
        }
        Err(err) => {
            error!(name = %name, delta, error = %err, "score update failed");
            None
        }
    }
}

/// Current standings for the scoreboard.
pub async fn standings(state: &SharedState) -> Result<Vec<TeamSummary>, ServiceError> {
    let standings = state.ledger().standings().await?;
    Ok(standings.into_iter().map(TeamSummary::from).collect())
}
