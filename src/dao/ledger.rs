//! Score ledger collaborator: team name to points, owned outside of the session.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{fs, sync::Mutex};

use crate::{
    config::LedgerConfig,
    dao::storage::{StorageError, StorageResult},
};

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors returned by a [`ScoreLedger`].
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The update references a team missing from the roster.
    #[error("unknown participant `{0}`")]
    UnknownParticipant(String),
    /// The backing store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A team entry as stored in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStanding {
    /// Team name, matching the name its buzzer claims.
    pub name: String,
    /// Accumulated points, never negative.
    pub points: i64,
}

/// Abstraction over the team roster the moderator awards points to.
pub trait ScoreLedger: Send + Sync {
    /// Current roster in stored order.
    fn standings(&self) -> BoxFuture<'static, LedgerResult<Vec<TeamStanding>>>;
    /// Add `delta` (possibly negative) to `name`, returning the updated entry.
    fn add_points(&self, name: String, delta: i64) -> BoxFuture<'static, LedgerResult<TeamStanding>>;
    /// Verify that the roster can be read.
    fn health_check(&self) -> BoxFuture<'static, LedgerResult<()>>;
}

/// Build the ledger described by `config`.
pub fn from_config(config: &LedgerConfig) -> Arc<dyn ScoreLedger> {
    match config {
        LedgerConfig::File { path } => Arc::new(JsonFileLedger::new(path.clone())),
        LedgerConfig::Memory { teams } => Arc::new(MemoryLedger::new(teams.iter().cloned())),
    }
}

fn apply_delta(points: i64, delta: i64) -> i64 {
    points.saturating_add(delta).max(0)
}

/// Ledger persisted as a JSON array of `{ "name", "points" }` objects.
///
/// Updates are serialised through an async mutex and written through a
/// temporary file so readers never observe a truncated roster.
pub struct JsonFileLedger {
    path: PathBuf,
    write_gate: Arc<Mutex<()>>,
}

impl JsonFileLedger {
    /// Ledger reading and writing `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_gate: Arc::new(Mutex::new(())),
        }
    }
}

impl ScoreLedger for JsonFileLedger {
    fn standings(&self) -> BoxFuture<'static, LedgerResult<Vec<TeamStanding>>> {
        let path = self.path.clone();
        Box::pin(async move { Ok(read_roster(&path).await?) })
    }

    fn add_points(&self, name: String, delta: i64) -> BoxFuture<'static, LedgerResult<TeamStanding>> {
        let path = self.path.clone();
        let gate = self.write_gate.clone();
        Box::pin(async move {
            let _guard = gate.lock().await;
            let mut roster = read_roster(&path).await?;
            let team = roster
                .iter_mut()
                .find(|team| team.name == name)
                .ok_or_else(|| LedgerError::UnknownParticipant(name.clone()))?;
            team.points = apply_delta(team.points, delta);
            let updated = team.clone();
            write_roster(&path, &roster).await?;
            Ok(updated)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, LedgerResult<()>> {
        let path = self.path.clone();
        Box::pin(async move {
            read_roster(&path).await?;
            Ok(())
        })
    }
}

async fn read_roster(path: &Path) -> StorageResult<Vec<TeamStanding>> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(StorageError::unavailable("reading roster", path, err));
        }
    };
    serde_json::from_str(&contents)
        .map_err(|err| StorageError::unavailable("decoding roster", path, err))
}

async fn write_roster(path: &Path, roster: &[TeamStanding]) -> StorageResult<()> {
    let payload = serde_json::to_string_pretty(roster)
        .map_err(|err| StorageError::unavailable("encoding roster", path, err))?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, payload)
        .await
        .map_err(|err| StorageError::unavailable("writing roster", &staging, err))?;
    fs::rename(&staging, path)
        .await
        .map_err(|err| StorageError::unavailable("replacing roster", path, err))
}

/// In-process ledger seeded with a fixed roster.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    teams: Arc<Mutex<IndexMap<String, i64>>>,
}

impl MemoryLedger {
    /// Ledger holding `names`, each starting at zero points.
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let teams = names.into_iter().map(|name| (name, 0)).collect();
        Self {
            teams: Arc::new(Mutex::new(teams)),
        }
    }
}

impl ScoreLedger for MemoryLedger {
    fn standings(&self) -> BoxFuture<'static, LedgerResult<Vec<TeamStanding>>> {
        let teams = self.teams.clone();
        Box::pin(async move {
            let guard = teams.lock().await;
            Ok(guard
                .iter()
                .map(|(name, points)| TeamStanding {
                    name: name.clone(),
                    points: *points,
                })
                .collect())
        })
    }

    fn add_points(&self, name: String, delta: i64) -> BoxFuture<'static, LedgerResult<TeamStanding>> {
        let teams = self.teams.clone();
        Box::pin(async move {
            let mut guard = teams.lock().await;
            let points = guard
                .get_mut(&name)
                .ok_or_else(|| LedgerError::UnknownParticipant(name.clone()))?;
            *points = apply_delta(*points, delta);
            Ok(TeamStanding {
                points: *points,
                name,
            })
        })
    }

    fn health_check(&self) -> BoxFuture<'static, LedgerResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
