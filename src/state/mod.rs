/// Ordered, deduplicated buzz-in queue.
pub mod buzz_queue;
mod hub;
/// Questions and their played keys.
pub mod question;
/// Participant name registry.
pub mod registry;
/// Round phase state machine.
pub mod round;
/// Session aggregate applying client commands.
pub mod session;
/// Luck wheel state and effects.
pub mod wheel;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{ledger::ScoreLedger, question_bank::QuestionBank},
    dto::ws::ClientRole,
    state::session::Session,
};

pub use self::hub::BroadcastHub;

/// Handle to the application state shared by every handler.
pub type SharedState = Arc<AppState>;

/// Identifier handed to every WebSocket connection.
pub type ConnectionId = Uuid;

/// A live WebSocket client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientConnection {
    /// Identifier sent back in the welcome frame.
    pub id: ConnectionId,
    /// Role granted at upgrade time.
    pub role: ClientRole,
}

/// Central application state: the authoritative session, its broadcast hub and collaborators.
pub struct AppState {
    config: Arc<AppConfig>,
    session: Mutex<Session>,
    hub: BroadcastHub,
    connections: DashMap<ConnectionId, ClientConnection>,
    ledger: Arc<dyn ScoreLedger>,
    questions: QuestionBank,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        config: AppConfig,
        ledger: Arc<dyn ScoreLedger>,
        questions: QuestionBank,
    ) -> SharedState {
        let session = Session::new(config.wheel().clone());
        let hub = BroadcastHub::new(config.broadcast_capacity());
        Arc::new(Self {
            config: Arc::new(config),
            session: Mutex::new(session),
            hub,
            connections: DashMap::new(),
            ledger,
            questions,
        })
    }

    /// Access the loaded application configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }

    /// Lock the session. Holders broadcast before releasing so subscribers see updates in
    /// processing order.
    pub async fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }

    /// Run `f` against a read-only view of the session.
    pub async fn with_session<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&Session) -> T,
    {
        let guard = self.session.lock().await;
        f(&guard)
    }

    /// Hub relaying broadcasts to every subscriber.
    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Registry of active WebSocket clients keyed by connection id.
    pub fn connections(&self) -> &DashMap<ConnectionId, ClientConnection> {
        &self.connections
    }

    /// Score ledger collaborator.
    pub fn ledger(&self) -> Arc<dyn ScoreLedger> {
        self.ledger.clone()
    }

    /// Question bank loaded at startup; empty when none was configured.
    pub fn questions(&self) -> &QuestionBank {
        &self.questions
    }
}
