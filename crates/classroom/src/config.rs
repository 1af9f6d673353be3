//! Configuration for the client.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default backend base URL (the `/api` prefix is part of the base).
const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/";

/// File holding the persisted session, next to the working directory by
/// default (the terminal equivalent of the browser's fixed storage keys).
const DEFAULT_SESSION_FILE: &str = ".classroom_session.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend URL '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the backend REST API
    pub base_url: Url,
    /// Where the session (identity + credential) is persisted
    pub session_file: PathBuf,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default URL is valid"),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AppConfig {
    /// Builds a configuration from the environment, falling back to defaults.
    ///
    /// Recognized variables:
    /// * `CLASSROOM_API_URL` — backend base URL
    /// * `CLASSROOM_SESSION_FILE` — session persistence path
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("CLASSROOM_API_URL") {
            // A base without a trailing slash would swallow its last segment
            // when joined against, so add one.
            let normalized = if value.ends_with('/') {
                value.clone()
            } else {
                format!("{value}/")
            };
            config.base_url =
                Url::parse(&normalized).map_err(|source| ConfigError::InvalidBaseUrl {
                    value,
                    source,
                })?;
        }

        if let Ok(value) = std::env::var("CLASSROOM_SESSION_FILE") {
            config.session_file = PathBuf::from(value);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url_joins_cleanly() {
        let config = AppConfig::default();
        let joined = config.base_url.join("classes/me").unwrap();
        assert_eq!(joined.as_str(), "http://localhost:5000/api/classes/me");
    }

    #[test]
    fn test_default_timeouts() {
        let config = AppConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
