//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CATALOG_API_URL` - Base URL of the catalog API (default: `http://localhost:8000`)
//! - `CATALOG_TIMEOUT_SECS` - Per-request timeout for catalog calls (default: 5)
//! - `CATALOG_CACHE_TTL_SECS` - Cache lifetime for catalog responses, 0 disables (default: 60)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: `http://localhost:3000`)
//! - `SESSION_EXPIRY_SECS` - Idle lifetime of a session and its cart (default: 7 days)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default catalog API location for local development.
pub const DEFAULT_CATALOG_API_URL: &str = "http://localhost:8000";

const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 5;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_SESSION_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Idle lifetime of a session (and the cart it owns)
    pub session_expiry: Duration,
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL, always ending in `/`
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Response cache lifetime (`Duration::ZERO` disables caching)
    pub cache_ttl: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: parse_base_url("CATALOG_API_URL", DEFAULT_CATALOG_API_URL)
                .unwrap_or_else(|_| unreachable!("default catalog URL is valid")),
            timeout: Duration::from_secs(DEFAULT_CATALOG_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_env_or("STOREFRONT_PORT", 3000_u16)?;
        let base_url = parse_base_url(
            "STOREFRONT_BASE_URL",
            &get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000"),
        )?;
        let session_expiry = Duration::from_secs(parse_env_or(
            "SESSION_EXPIRY_SECS",
            DEFAULT_SESSION_EXPIRY_SECS,
        )?);

        let catalog = CatalogConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            session_expiry,
            catalog,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or("SENTRY_SAMPLE_RATE", 1.0_f32)?,
            sentry_traces_sample_rate: parse_env_or("SENTRY_TRACES_SAMPLE_RATE", 0.0_f32)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: parse_base_url("STOREFRONT_BASE_URL", "http://localhost:3000")
                .unwrap_or_else(|_| unreachable!("default base URL is valid")),
            session_expiry: Duration::from_secs(DEFAULT_SESSION_EXPIRY_SECS),
            catalog: CatalogConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(
                "CATALOG_API_URL",
                &get_env_or_default("CATALOG_API_URL", DEFAULT_CATALOG_API_URL),
            )?,
            timeout: Duration::from_secs(parse_env_or(
                "CATALOG_TIMEOUT_SECS",
                DEFAULT_CATALOG_TIMEOUT_SECS,
            )?),
            cache_ttl: Duration::from_secs(parse_env_or(
                "CATALOG_CACHE_TTL_SECS",
                DEFAULT_CATALOG_CACHE_TTL_SECS,
            )?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse an absolute http(s) URL and make sure its path ends in `/`, so that
/// relative joins keep any path prefix (`https://host/shop/` + `api/...`).
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("TEST", "https://api.example.com/shop").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/shop/");
        assert_eq!(
            url.join("api/products/").unwrap().as_str(),
            "https://api.example.com/shop/api/products/"
        );
    }

    #[test]
    fn test_parse_base_url_bare_host() {
        let url = parse_base_url("TEST", "http://localhost:8000").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        let err = parse_base_url("CATALOG_API_URL", "not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CATALOG_API_URL"));
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        assert!(parse_base_url("TEST", "ftp://files.example.com").is_err());
    }

    #[test]
    fn test_catalog_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            port: 8080,
            ..StorefrontConfig::default()
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_is_secure() {
        let mut config = StorefrontConfig::default();
        assert!(!config.is_secure());
        config.base_url = Url::parse("https://shop.example.com/").unwrap();
        assert!(config.is_secure());
    }
}
