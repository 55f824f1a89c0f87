//! Portal configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `NEWSSTAND_API_BASE_URL` - Base URL of the portal backend
//!   (e.g., `https://api.example.com`)
//!
//! ## Optional
//! - `NEWSSTAND_SESSION_FILE` - Path for the persisted session
//!   (default: `.newsstand-session.json`)
//! - `NEWSSTAND_COOKIE_FILE` - Path for the persisted cookie jar carrying
//!   the refresh cookie (default: `.newsstand-cookies.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Default filename for the persisted session, relative to the working
/// directory.
const DEFAULT_SESSION_FILE: &str = ".newsstand-session.json";

/// Default filename for the persisted cookie jar, next to the session file.
const DEFAULT_COOKIE_FILE: &str = ".newsstand-cookies.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Portal application configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL of the portal backend. Stored without a trailing slash.
    pub api_base_url: String,
    /// Path for the persisted session file.
    pub session_file: PathBuf,
    /// Path for the persisted cookie jar. The HTTP-only refresh cookie has
    /// to outlive the process that logged in.
    pub cookie_file: PathBuf,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
    /// Sentry environment name.
    pub sentry_environment: Option<String>,
}

impl PortalConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or the base
    /// URL does not parse as an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_required_env("NEWSSTAND_API_BASE_URL")?;
        let api_base_url = validate_base_url(&api_base_url, "NEWSSTAND_API_BASE_URL")?;

        let session_file =
            PathBuf::from(get_env_or_default("NEWSSTAND_SESSION_FILE", DEFAULT_SESSION_FILE));
        let cookie_file =
            PathBuf::from(get_env_or_default("NEWSSTAND_COOKIE_FILE", DEFAULT_COOKIE_FILE));

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            api_base_url,
            session_file,
            cookie_file,
            sentry_dsn,
            sentry_environment,
        })
    }
}

/// Validate and normalize the backend base URL.
///
/// Must be absolute http(s); any trailing slash is stripped so endpoint
/// paths can be appended uniformly.
fn validate_base_url(value: &str, var: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var.to_string(), e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            var.to_string(),
            format!("expected http(s) URL, got scheme {}", url.scheme()),
        ));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            var.to_string(),
            "URL must have a host".to_string(),
        ));
    }

    Ok(value.trim_end_matches('/').to_string())
}

/// Get a required environment variable.
fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
