//! Directory client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `MYBN_API_BASE_URL` - Catalog service base URL (default: `https://mybn.in/api/v1/`)
//! - `MYBN_API_TIMEOUT_MS` - Request timeout applied to every call (default: 10000)
//! - `MYBN_CACHE_TTL_SECS` - Business detail cache lifetime (default: 300)
//! - `MYBN_PAGE_SIZE` - Businesses per listing page (default: 6)
//! - `MYBN_SEARCH_LIMIT` - Maximum results for a filtered search (default: 100)
//! - `MYBN_STORAGE_PATH` - Session file used by the CLI (default: `.mybn/session.json`)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default catalog service base URL.
pub const DEFAULT_BASE_URL: &str = "https://mybn.in/api/v1/";

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_PAGE_SIZE: u32 = 6;
const DEFAULT_SEARCH_LIMIT: u32 = 100;
const DEFAULT_STORAGE_PATH: &str = ".mybn/session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Directory client configuration.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Catalog service configuration
    pub api: ApiConfig,
    /// Listing screen configuration
    pub listing: ListingConfig,
    /// Location of the file-backed session store
    pub storage_path: PathBuf,
}

/// Catalog service connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/`
    pub base_url: Url,
    /// Global request timeout
    pub timeout: Duration,
    /// Lifetime of cached business details
    pub cache_ttl: Duration,
}

/// Listing pagination settings.
#[derive(Debug, Clone, Copy)]
pub struct ListingConfig {
    /// Businesses requested per page
    pub page_size: u32,
    /// Maximum rows returned by a filter search
    pub search_limit: u32,
}

impl ApiConfig {
    /// Settings for `base_url` with the default timeout and cache lifetime.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl DirectoryConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(
            lookup("MYBN_API_BASE_URL")
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL),
        )?;
        let timeout_ms = parse_or_default(&lookup, "MYBN_API_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        let cache_ttl = parse_or_default(&lookup, "MYBN_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        let page_size = parse_or_default(&lookup, "MYBN_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let search_limit = parse_or_default(&lookup, "MYBN_SEARCH_LIMIT", DEFAULT_SEARCH_LIMIT)?;

        if timeout_ms == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "MYBN_API_TIMEOUT_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "MYBN_PAGE_SIZE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let storage_path = lookup("MYBN_STORAGE_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from);

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout: Duration::from_millis(timeout_ms),
                cache_ttl: Duration::from_secs(cache_ttl),
            },
            listing: ListingConfig {
                page_size,
                search_limit,
            },
            storage_path,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, making sure relative endpoint paths join under it.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| {
        ConfigError::InvalidEnvVar("MYBN_API_BASE_URL".to_string(), e.to_string())
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "MYBN_API_BASE_URL".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Parse a variable with `FromStr`, or return the default if unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<DirectoryConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        DirectoryConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.listing.page_size, 6);
        assert_eq!(config.storage_path, PathBuf::from(".mybn/session.json"));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = load(&[("MYBN_API_BASE_URL", "http://localhost:8080/api/v1")]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:8080/api/v1/");
        assert_eq!(
            config.api.base_url.join("businesses").unwrap().as_str(),
            "http://localhost:8080/api/v1/businesses"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = load(&[("MYBN_API_BASE_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "MYBN_API_BASE_URL"));
    }

    #[test]
    fn test_invalid_number() {
        let err = load(&[("MYBN_PAGE_SIZE", "six")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "MYBN_PAGE_SIZE"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(load(&[("MYBN_PAGE_SIZE", "0")]).is_err());
        assert!(load(&[("MYBN_API_TIMEOUT_MS", "0")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("MYBN_API_TIMEOUT_MS", "2500"),
            ("MYBN_PAGE_SIZE", "20"),
            ("MYBN_SEARCH_LIMIT", "50"),
            ("MYBN_CACHE_TTL_SECS", "60"),
            ("MYBN_STORAGE_PATH", "/tmp/mybn.json"),
        ])
        .unwrap();
        assert_eq!(config.api.timeout, Duration::from_millis(2500));
        assert_eq!(config.api.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.listing.page_size, 20);
        assert_eq!(config.listing.search_limit, 50);
        assert_eq!(config.storage_path, PathBuf::from("/tmp/mybn.json"));
    }
}
