//! Application-level configuration loading: passphrase gate, disconnect policy,
//! score ledger backend, question bank location and wheel effects.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::wheel::WheelEffects;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BUZZBOARD_CONFIG_PATH";
/// Environment variable that overrides the configured moderator passphrase.
const PASSPHRASE_ENV: &str = "BUZZBOARD_PASSPHRASE";
const DEFAULT_LEDGER_PATH: &str = "data/teams.json";
const DEFAULT_QUESTION_BANK_PATH: &str = "data/qna.json";
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// What happens to the names a client claimed when its connection drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectPolicy {
    /// Keep the names claimed; the client can reconnect and keep its slot.
    #[default]
    Retain,
    /// Free every name the dropped connection still owns.
    Release,
}

/// Backend used for the team score ledger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerConfig {
    /// JSON roster file shared with the team management tooling.
    File {
        /// Path to the roster file.
        path: PathBuf,
    },
    /// In-process roster, lost on restart.
    Memory {
        /// Team names seeded with zero points.
        #[serde(default)]
        teams: Vec<String>,
    },
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::File {
            path: PathBuf::from(DEFAULT_LEDGER_PATH),
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    passphrase: Option<String>,
    disconnect_policy: DisconnectPolicy,
    ledger: LedgerConfig,
    question_bank_path: PathBuf,
    broadcast_capacity: usize,
    wheel: WheelEffects,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    ///
    /// `BUZZBOARD_PASSPHRASE` wins over the passphrase stored in the file.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        gated = config.passphrase.is_some(),
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        match env::var(PASSPHRASE_ENV) {
            Ok(passphrase) if !passphrase.is_empty() => config.with_passphrase(Some(passphrase)),
            _ => config,
        }
    }

    /// Parse a configuration document, filling absent keys with defaults.
    pub fn from_json_str(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Replace the moderator passphrase; `None` opens the gate.
    pub fn with_passphrase(mut self, passphrase: Option<String>) -> Self {
        self.passphrase = passphrase.filter(|value| !value.is_empty());
        self
    }

    /// Replace the disconnect policy.
    pub fn with_disconnect_policy(mut self, policy: DisconnectPolicy) -> Self {
        self.disconnect_policy = policy;
        self
    }

    /// Replace the wheel effects.
    pub fn with_wheel(mut self, wheel: WheelEffects) -> Self {
        self.wheel = wheel;
        self
    }

    /// Whether `provided` opens the moderator gate. An unset passphrase accepts anyone.
    pub fn passphrase_matches(&self, provided: Option<&str>) -> bool {
        match &self.passphrase {
            None => true,
            Some(expected) => provided == Some(expected.as_str()),
        }
    }

    /// Policy applied when a connection drops.
    pub fn disconnect_policy(&self) -> DisconnectPolicy {
        self.disconnect_policy
    }

    /// Score ledger backend.
    pub fn ledger(&self) -> &LedgerConfig {
        &self.ledger
    }

    /// Location of the question bank file.
    pub fn question_bank_path(&self) -> &PathBuf {
        &self.question_bank_path
    }

    /// Capacity of the broadcast channel feeding connected clients.
    pub fn broadcast_capacity(&self) -> usize {
        self.broadcast_capacity
    }

    /// Effects the luck wheels can land on.
    pub fn wheel(&self) -> &WheelEffects {
        &self.wheel
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            passphrase: None,
            disconnect_policy: DisconnectPolicy::default(),
            ledger: LedgerConfig::default(),
            question_bank_path: PathBuf::from(DEFAULT_QUESTION_BANK_PATH),
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
            wheel: default_wheel(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    passphrase: Option<String>,
    disconnect_policy: Option<DisconnectPolicy>,
    ledger: Option<LedgerConfig>,
    question_bank_path: Option<PathBuf>,
    broadcast_capacity: Option<usize>,
    wheel: Option<WheelEffects>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            passphrase: value.passphrase.filter(|value| !value.is_empty()),
            disconnect_policy: value.disconnect_policy.unwrap_or(defaults.disconnect_policy),
            ledger: value.ledger.unwrap_or(defaults.ledger),
            question_bank_path: value
                .question_bank_path
                .unwrap_or(defaults.question_bank_path),
            broadcast_capacity: value
                .broadcast_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.broadcast_capacity),
            wheel: value.wheel.unwrap_or(defaults.wheel),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in wheel effects shipped with the binary.
fn default_wheel() -> WheelEffects {
    WheelEffects {
        good: vec![
            "Double points on the next question".into(),
            "Steal 100 points from another team".into(),
            "Skip a wrong answer penalty".into(),
            "Pick the next category".into(),
        ],
        bad: vec![
            "Lose 100 points".into(),
            "Give 100 points to another team".into(),
            "Sit out the next question".into(),
            "Answer the next question first".into(),
        ],
    }
}
