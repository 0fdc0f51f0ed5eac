//! Client configuration.
//!
//! # Responsibility
//! - Hold the cache keys, remote endpoints and sync mode of one store.
//! - Read overrides from the process environment.
//!
//! # Invariants
//! - Missing endpoints are allowed; the store degrades to local-only and
//!   reports remote calls as not configured.

use crate::sync::SyncMode;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default cache key holding the serialized collection.
pub const DEFAULT_STORAGE_KEY: &str = "deploy_notes_tips";
/// Cache key holding the RFC 3339 time of the last successful refresh.
pub const LAST_SYNC_KEY: &str = "deploy_notes_last_sync";

pub const ENV_STORAGE_KEY: &str = "DEPLOYNOTES_STORAGE_KEY";
pub const ENV_REMOTE_URL: &str = "DEPLOYNOTES_REMOTE_URL";
pub const ENV_SYNC_URL: &str = "DEPLOYNOTES_SYNC_URL";
pub const ENV_SYNC_MODE: &str = "DEPLOYNOTES_SYNC_MODE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for {key}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings for one [`crate::NoteStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_key: String,
    pub last_sync_key: String,
    /// URL of the raw remote snapshot (read path).
    pub remote_url: Option<String>,
    /// URL of the sync proxy endpoint (write path).
    pub sync_url: Option<String>,
    pub sync_mode: SyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            last_sync_key: LAST_SYNC_KEY.to_string(),
            remote_url: None,
            sync_url: None,
            sync_mode: SyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Builds a config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Blank values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(key) = read(ENV_STORAGE_KEY) {
            config.storage_key = key;
        }
        config.remote_url = read(ENV_REMOTE_URL);
        config.sync_url = read(ENV_SYNC_URL);
        if let Some(mode) = read(ENV_SYNC_MODE) {
            config.sync_mode = SyncMode::parse(&mode).ok_or(ConfigError::InvalidValue {
                key: ENV_SYNC_MODE,
                value: mode,
            })?;
        }
        Ok(config)
    }
}
