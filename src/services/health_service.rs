use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the score ledger and report live connection counters.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let ledger_ok = match state.ledger().health_check().await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "score ledger health check failed");
            false
        }
    };
    let participants = state.with_session(|session| session.registry().len()).await;

    HealthResponse::new(ledger_ok, state.connections().len(), participants)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            ledger::{JsonFileLedger, MemoryLedger},
            question_bank::QuestionBank,
        },
        state::AppState,
    };

    #[tokio::test]
    async fn reports_ok_with_readable_ledger() {
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(MemoryLedger::default()),
            QuestionBank::default(),
        );
        let health = health_status(&state).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.connections, 0);
        assert_eq!(health.participants, 0);
    }

    #[tokio::test]
    async fn reports_degraded_with_corrupt_roster() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teams.json");
        std::fs::write(&path, "{").unwrap();
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(JsonFileLedger::new(path)),
            QuestionBank::default(),
        );
        assert_eq!(health_status(&state).await.status, "degraded");
    }
}
