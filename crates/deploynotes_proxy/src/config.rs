//! Proxy configuration from the process environment.
//!
//! # Invariants
//! - The write credential never appears in `Debug` output or logs.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub const ENV_GIST_ID: &str = "GIST_ID";
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_FILE_NAME: &str = "GIST_FILE_NAME";
pub const ENV_API_BASE: &str = "GITHUB_API_BASE";
pub const ENV_BIND_ADDR: &str = "PROXY_BIND_ADDR";

pub const DEFAULT_FILE_NAME: &str = "tips.json";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "required environment variable {key} is not set"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub gist_id: String,
    pub token: String,
    pub file_name: String,
    pub api_base: String,
    pub bind_addr: String,
}

impl Debug for ProxyConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("gist_id", &self.gist_id)
            .field("token", &"<redacted>")
            .field("file_name", &self.file_name)
            .field("api_base", &self.api_base)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl ProxyConfig {
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
        let require = |key: &'static str| read(key).ok_or(ConfigError::Missing(key));

        Ok(Self {
            gist_id: require(ENV_GIST_ID)?,
            token: require(ENV_TOKEN)?,
            file_name: read(ENV_FILE_NAME).unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
            api_base: read(ENV_API_BASE)
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            bind_addr: read(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ProxyConfig, DEFAULT_API_BASE, DEFAULT_FILE_NAME};

    #[test]
    fn requires_gist_id_and_token() {
        let err = ProxyConfig::from_lookup(|key| {
            (key == "GIST_ID").then(|| "abc123".to_string())
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("GITHUB_TOKEN"));
    }

    #[test]
    fn applies_defaults_and_redacts_token() {
        let config = ProxyConfig::from_lookup(|key| match key {
            "GIST_ID" => Some("abc123".to_string()),
            "GITHUB_TOKEN" => Some("ghp_secret".to_string()),
            "GITHUB_API_BASE" => Some("  ".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.file_name, DEFAULT_FILE_NAME);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        let debug = format!("{config:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("<redacted>"));
    }
}
