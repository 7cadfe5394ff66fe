//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required in production
//! - `VITRINE_API_URL` - Base URL of the upstream REST API
//!
//! ## Optional
//! - `VITRINE_ENV` - `development` or `production` (default: development)
//! - `VITRINE_API_URL` - In development defaults to `http://localhost:3000/api`
//! - `VITRINE_POSTAL_URL` - CEP lookup service (default: `https://viacep.com.br`)
//! - `VITRINE_DATA_DIR` - Where the cart and session files live (default: `.vitrine`)
//! - `VITRINE_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `VITRINE_RETRY_MAX_ATTEMPTS` - Attempts for idempotent requests (default: 3)
//! - `VITRINE_RETRY_BASE_DELAY_MS` - First backoff delay (default: 500)
//! - `VITRINE_RETRY_MAX_DELAY_MS` - Backoff cap (default: 5000)
//! - `VITRINE_ORDER_MODE` - `simulated` or `api` (default: simulated)
//! - `VITRINE_SIMULATED_ORDER_DELAY_MS` - Simulated submission delay (default: 2000)
//! - `VITRINE_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::api::RetryPolicy;

const DEFAULT_DEV_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_POSTAL_URL: &str = "https://viacep.com.br";
const CART_FILE: &str = "cart.json";
const SESSION_FILE: &str = "session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("expected development or production, got {other}")),
        }
    }
}

/// How checkout submits orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderMode {
    /// Wait a fixed delay and issue a local order number.
    #[default]
    Simulated,
    /// `POST /orders` on the upstream API.
    Api,
}

impl FromStr for OrderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" | "mock" => Ok(Self::Simulated),
            "api" => Ok(Self::Api),
            other => Err(format!("expected simulated or api, got {other}")),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected pretty or json, got {other}")),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Upstream REST API base URL (always ends with `/`)
    pub api_base_url: Url,
    /// CEP lookup service base URL (always ends with `/`)
    pub postal_base_url: Url,
    /// Directory holding the cart and session files
    pub data_dir: PathBuf,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
    /// Retry policy for idempotent API requests
    pub retry: RetryPolicy,
    /// Order submission mode
    pub order_mode: OrderMode,
    /// Delay used by the simulated order gateway
    pub simulated_order_delay: Duration,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let environment: Environment = vars.parsed_or("VITRINE_ENV", Environment::Development)?;

        let api_base_url = match (vars.optional("VITRINE_API_URL"), environment) {
            (Some(raw), _) => parse_base_url("VITRINE_API_URL", &raw)?,
            (None, Environment::Development) => {
                parse_base_url("VITRINE_API_URL", DEFAULT_DEV_API_URL)?
            }
            (None, Environment::Production) => {
                return Err(ConfigError::MissingEnvVar("VITRINE_API_URL".to_string()));
            }
        };

        let postal_base_url = parse_base_url(
            "VITRINE_POSTAL_URL",
            &vars.or_default("VITRINE_POSTAL_URL", DEFAULT_POSTAL_URL),
        )?;

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: vars.parsed_or("VITRINE_RETRY_MAX_ATTEMPTS", defaults.max_attempts)?,
            base_delay: Duration::from_millis(vars.parsed_or(
                "VITRINE_RETRY_BASE_DELAY_MS",
                duration_millis(defaults.base_delay),
            )?),
            max_delay: Duration::from_millis(vars.parsed_or(
                "VITRINE_RETRY_MAX_DELAY_MS",
                duration_millis(defaults.max_delay),
            )?),
            ..defaults
        };
        if retry.max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "VITRINE_RETRY_MAX_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            environment,
            api_base_url,
            postal_base_url,
            data_dir: PathBuf::from(vars.or_default("VITRINE_DATA_DIR", ".vitrine")),
            http_timeout: Duration::from_secs(vars.parsed_or("VITRINE_HTTP_TIMEOUT_SECS", 30)?),
            retry,
            order_mode: vars.parsed_or("VITRINE_ORDER_MODE", OrderMode::Simulated)?,
            simulated_order_delay: Duration::from_millis(
                vars.parsed_or("VITRINE_SIMULATED_ORDER_DELAY_MS", 2000)?,
            ),
            log_format: vars.parsed_or("VITRINE_LOG_FORMAT", LogFormat::Pretty)?,
            sentry_dsn: vars.optional("SENTRY_DSN"),
        })
    }

    /// Configuration for tests and embedding: everything defaulted, with both
    /// the API and the CEP lookup served from `base_url` and files kept under
    /// `data_dir`.
    #[must_use]
    pub fn for_api(base_url: Url, data_dir: impl AsRef<Path>) -> Self {
        let base_url = with_trailing_slash(base_url);
        Self {
            environment: Environment::Development,
            api_base_url: base_url.clone(),
            postal_base_url: base_url,
            data_dir: data_dir.as_ref().to_path_buf(),
            http_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            order_mode: OrderMode::Simulated,
            simulated_order_delay: Duration::from_millis(2000),
            log_format: LogFormat::Pretty,
            sentry_dsn: None,
        }
    }

    /// Path of the persisted cart.
    #[must_use]
    pub fn cart_path(&self) -> PathBuf {
        self.data_dir.join(CART_FILE)
    }

    /// Path of the persisted auth session.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source with the usual required/optional/default accessors.
struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Parse an absolute http(s) URL and make sure relative joins keep its path.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    Ok(with_trailing_slash(url))
}

/// `Url::join` drops the last path segment unless it ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_development_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.api_base_url.as_str(), "http://localhost:3000/api/");
        assert_eq!(config.postal_base_url.as_str(), "https://viacep.com.br/");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.order_mode, OrderMode::Simulated);
        assert_eq!(config.cart_path(), PathBuf::from(".vitrine/cart.json"));
    }

    #[test]
    fn test_production_requires_api_url() {
        let err = config_from(&[("VITRINE_ENV", "production")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "VITRINE_API_URL"));
    }

    #[test]
    fn test_production_with_api_url() {
        let config = config_from(&[
            ("VITRINE_ENV", "production"),
            ("VITRINE_API_URL", "https://api.loja.com.br/v1"),
            ("VITRINE_ORDER_MODE", "api"),
        ])
        .unwrap();
        assert_eq!(config.api_base_url.as_str(), "https://api.loja.com.br/v1/");
        assert_eq!(config.api_base_url.join("products").unwrap().path(), "/v1/products");
        assert_eq!(config.order_mode, OrderMode::Api);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        assert!(matches!(
            config_from(&[("VITRINE_API_URL", "ftp://example.com")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            config_from(&[("VITRINE_RETRY_MAX_ATTEMPTS", "many")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            config_from(&[("VITRINE_RETRY_MAX_ATTEMPTS", "0")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_retry_overrides() {
        let config = config_from(&[
            ("VITRINE_RETRY_MAX_ATTEMPTS", "5"),
            ("VITRINE_RETRY_BASE_DELAY_MS", "10"),
            ("VITRINE_RETRY_MAX_DELAY_MS", "40"),
        ])
        .unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay, Duration::from_millis(10));
        assert_eq!(config.retry.max_delay, Duration::from_millis(40));
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = config_from(&[("SENTRY_DSN", ""), ("VITRINE_LOG_FORMAT", "json")]).unwrap();
        assert!(config.sentry_dsn.is_none());
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
