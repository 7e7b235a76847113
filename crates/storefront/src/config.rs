//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `PAPERBACK_HOSTNAME` - Runtime hostname used to pick the API environment (default: localhost)
//! - `PAPERBACK_ENV` - Set to `production` to force the production API
//! - `PAPERBACK_API_URL` - Explicit API base URL, overrides environment selection
//! - `PAPERBACK_PRODUCTION_API_URL` - Production API origin (default: the hosted backend)
//! - `PAPERBACK_STATE_DIR` - Directory for persisted client state (default: .paperback)
//! - `PAPERBACK_ADMIN_PASSWORD` - Admin password for non-interactive login
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// API origin used when the client runs on `localhost`.
pub const DEVELOPMENT_API_URL: &str = "http://localhost:5000";

/// Hosted backend used everywhere else.
pub const DEFAULT_PRODUCTION_API_URL: &str = "https://mern-backend-dusky-eta.vercel.app/";

const LOCAL_HOSTNAME: &str = "localhost";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which remote deployment the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiEnvironment {
    Development,
    Production,
}

impl ApiEnvironment {
    /// Pick the environment from the runtime hostname and an optional
    /// explicit environment name.
    ///
    /// Anything other than `localhost` is production, and `production`
    /// always wins.
    #[must_use]
    pub fn resolve(hostname: &str, env: Option<&str>) -> Self {
        let forced = env.is_some_and(|e| e.trim().eq_ignore_ascii_case("production"));
        if forced || !hostname.trim().eq_ignore_ascii_case(LOCAL_HOSTNAME) {
            Self::Production
        } else {
            Self::Development
        }
    }
}

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the admin password.
#[derive(Clone)]
pub struct ClientConfig {
    /// Resolved deployment
    pub environment: ApiEnvironment,
    /// Base URL every API path is joined onto (always ends in `/`)
    pub api_base_url: Url,
    /// Directory holding the persisted admin token
    pub state_dir: PathBuf,
    /// Admin password for non-interactive login
    pub admin_password: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("environment", &self.environment)
            .field("api_base_url", &self.api_base_url.as_str())
            .field("state_dir", &self.state_dir)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("sentry_dsn", &self.sentry_dsn)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a URL variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a URL variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(lookup);

        let hostname = vars.get_or_default("PAPERBACK_HOSTNAME", LOCAL_HOSTNAME);
        let environment =
            ApiEnvironment::resolve(&hostname, vars.get_optional("PAPERBACK_ENV").as_deref());

        let api_base_url = match vars.get_optional("PAPERBACK_API_URL") {
            Some(explicit) => parse_base_url("PAPERBACK_API_URL", &explicit)?,
            None => match environment {
                ApiEnvironment::Development => {
                    parse_base_url("PAPERBACK_API_URL", DEVELOPMENT_API_URL)?
                }
                ApiEnvironment::Production => parse_base_url(
                    "PAPERBACK_PRODUCTION_API_URL",
                    &vars.get_or_default("PAPERBACK_PRODUCTION_API_URL", DEFAULT_PRODUCTION_API_URL),
                )?,
            },
        };

        Ok(Self {
            environment,
            api_base_url,
            state_dir: PathBuf::from(vars.get_or_default("PAPERBACK_STATE_DIR", ".paperback")),
            admin_password: vars
                .get_optional("PAPERBACK_ADMIN_PASSWORD")
                .map(SecretString::from),
            sentry_dsn: vars.get_optional("SENTRY_DSN"),
        })
    }

    /// Configuration pointing at an explicit API base URL, everything else
    /// defaulted. Used by tests and embedders that already know the backend.
    #[must_use]
    pub fn for_base_url(api_base_url: Url) -> Self {
        Self {
            environment: ApiEnvironment::Development,
            api_base_url: with_trailing_slash(api_base_url),
            state_dir: PathBuf::from(".paperback"),
            admin_password: None,
            sentry_dsn: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    /// Get an optional variable; blank values count as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }
}

fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(with_trailing_slash(url))
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_localhost_uses_development_api() {
        let config = config(&[]).unwrap();
        assert_eq!(config.environment, ApiEnvironment::Development);
        assert_eq!(config.api_base_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.state_dir, PathBuf::from(".paperback"));
    }

    #[test]
    fn test_other_hostname_uses_production_api() {
        let config = config(&[("PAPERBACK_HOSTNAME", "books.example.com")]).unwrap();
        assert_eq!(config.environment, ApiEnvironment::Production);
        assert_eq!(config.api_base_url.as_str(), DEFAULT_PRODUCTION_API_URL);
    }

    #[test]
    fn test_production_flag_wins_on_localhost() {
        let config = config(&[
            ("PAPERBACK_ENV", "production"),
            ("PAPERBACK_PRODUCTION_API_URL", "https://api.example.com/v1"),
        ])
        .unwrap();
        assert_eq!(config.environment, ApiEnvironment::Production);
        assert_eq!(config.api_base_url.as_str(), "https://api.example.com/v1/");
    }

    #[test]
    fn test_explicit_api_url_overrides_environment() {
        let config = config(&[
            ("PAPERBACK_HOSTNAME", "books.example.com"),
            ("PAPERBACK_API_URL", "http://127.0.0.1:9999"),
        ])
        .unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://127.0.0.1:9999/");
    }

    #[test]
    fn test_invalid_api_url() {
        let err = config(&[("PAPERBACK_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "PAPERBACK_API_URL"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = config(&[("PAPERBACK_ADMIN_PASSWORD", "hunter2-but-longer")]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2-but-longer"));
    }
}
