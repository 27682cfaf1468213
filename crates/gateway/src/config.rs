//! Gateway configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GATEWAY_URL` - Base URL of the backend gateway
//!   (default: `http://localhost:8090`)
//! - `GATEWAY_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default gateway location used by the demo deployment.
const DEFAULT_GATEWAY_URL: &str = "http://localhost:8090";

/// Default per-request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Gateway client configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL all request paths are joined onto.
    pub base_url: Url,
    /// Transport-level timeout applied to every request.
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_env_or_default("GATEWAY_URL", DEFAULT_GATEWAY_URL)
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("GATEWAY_URL".to_string(), e.to_string()))?;

        let timeout_secs = get_env_or_default(
            "GATEWAY_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("GATEWAY_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Build a configuration for a known gateway location.
    ///
    /// Used by tests pointing the client at an in-process mock.
    #[must_use]
    pub fn for_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_base_url() {
        let url: Url = "http://127.0.0.1:9999/".parse().expect("url");
        let config = GatewayConfig::for_base_url(url.clone());
        assert_eq!(config.base_url, url);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_default_gateway_url_parses() {
        assert!(DEFAULT_GATEWAY_URL.parse::<Url>().is_ok());
    }
}
