//! Configuration management and environment variable loading

use crate::{DuetError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the scripted demo conversation
pub const DEFAULT_FIXTURE_PATH: &str = "fixtures/chat.json";

/// Message fragment that switches the chat into demo playback
pub const DEFAULT_TRIGGER_PHRASE: &str = "Please analyze the subject's psychological state";

/// Pause between two revealed records during replay
pub const DEFAULT_REPLAY_INTERVAL_MS: u64 = 2000;

/// Load environment variables from .env file
///
/// Loads variables from a .env file in the current directory or a parent
/// directory. A missing file is not an error.
///
/// # Example
///
/// ```no_run
/// use duet_core::load_env;
///
/// load_env().ok();
/// let fixture = std::env::var("DUET_FIXTURE_PATH").unwrap_or_default();
/// ```
pub fn load_env() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::info!("✓ Loaded environment from: {}", path.display());
            Ok(())
        }
        Err(dotenvy::Error::LineParse(line, pos)) => Err(DuetError::config(format!(
            "Failed to parse .env file at line {}, position {}",
            line, pos
        ))),
        Err(dotenvy::Error::Io(_)) => {
            tracing::warn!("No .env file found - using system environment variables only");
            Ok(())
        }
        Err(e) => Err(DuetError::config(format!(
            "Failed to load .env file: {}",
            e
        ))),
    }
}

/// Get optional environment variable with default
pub fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get environment variable as boolean
pub fn get_env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| match v.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// Get environment variable as integer
pub fn get_env_int<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Settings shared by every chat session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// JSON fixture holding the scripted conversation
    pub fixture_path: PathBuf,

    /// Messages containing this phrase play the fixture back instead of echoing
    pub trigger_phrase: String,

    /// Delay between two replay snapshots
    pub replay_interval: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            fixture_path: PathBuf::from(DEFAULT_FIXTURE_PATH),
            trigger_phrase: DEFAULT_TRIGGER_PHRASE.to_string(),
            replay_interval: Duration::from_millis(DEFAULT_REPLAY_INTERVAL_MS),
        }
    }
}

impl SessionSettings {
    /// Build settings from `DUET_*` environment variables
    pub fn from_env() -> Self {
        Self {
            fixture_path: PathBuf::from(get_env_or("DUET_FIXTURE_PATH", DEFAULT_FIXTURE_PATH)),
            trigger_phrase: get_env_or("DUET_TRIGGER_PHRASE", DEFAULT_TRIGGER_PHRASE),
            replay_interval: Duration::from_millis(get_env_int(
                "DUET_REPLAY_INTERVAL_MS",
                DEFAULT_REPLAY_INTERVAL_MS,
            )),
        }
    }

    /// Override the fixture location
    pub fn with_fixture_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fixture_path = path.into();
        self
    }

    /// Override the replay delay
    pub fn with_replay_interval(mut self, interval: Duration) -> Self {
        self.replay_interval = interval;
        self
    }

    /// Reject settings that would make the trigger match every message
    pub fn validate(&self) -> Result<()> {
        if self.trigger_phrase.trim().is_empty() {
            return Err(DuetError::config("Trigger phrase cannot be empty"));
        }
        Ok(())
    }
}
