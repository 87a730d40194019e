//! Console configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). The resolved configuration is installed
//! once into a process-wide slot before any component starts and is never
//! mutated afterwards.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;

/// Default CRUD base address.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default push (WebSocket) address.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8083/ws";

static GLOBAL: OnceLock<ConsoleConfig> = OnceLock::new();

/// Top-level console configuration.
///
/// Loaded once at startup via [`ConsoleConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Base address of the offers REST API, without a trailing slash.
    pub api_url: String,

    /// Address of the live award WebSocket.
    pub ws_url: String,

    /// Per-request timeout for CRUD calls, in seconds.
    pub http_timeout_secs: u64,

    /// Number of historical awards to load into the feed on start
    /// (0 disables backfill).
    pub feed_backfill_limit: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            http_timeout_secs: 10,
            feed_backfill_limit: 0,
        }
    }
}

impl ConsoleConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to the loopback defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if either address is set but is
    /// not a valid URL with the expected scheme.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// `OFFERS_API_URL` and `OFFERS_WS_URL` take precedence over the
    /// front-end style `VITE_API_URL` and `VITE_WS_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] on an unparseable address or a
    /// scheme other than `http`/`https` (API) or `ws`/`wss` (push).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let (api_key, api_url) = first_set(&lookup, &["OFFERS_API_URL", "VITE_API_URL"])
            .unwrap_or(("OFFERS_API_URL", defaults.api_url));
        let api_url = validate_url(api_key, &api_url, &["http", "https"])?;

        let (ws_key, ws_url) = first_set(&lookup, &["OFFERS_WS_URL", "VITE_WS_URL"])
            .unwrap_or(("OFFERS_WS_URL", defaults.ws_url));
        let ws_url = validate_url(ws_key, &ws_url, &["ws", "wss"])?;

        let http_timeout_secs =
            parse_value(&lookup, "HTTP_TIMEOUT_SECS", defaults.http_timeout_secs);
        let feed_backfill_limit =
            parse_value(&lookup, "FEED_BACKFILL_LIMIT", defaults.feed_backfill_limit);

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            ws_url,
            http_timeout_secs,
            feed_backfill_limit,
        })
    }

    /// Installs this configuration as the process-wide instance.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyInstalled`] if a configuration was
    /// installed before.
    pub fn install(self) -> Result<&'static Self, ConfigError> {
        GLOBAL.set(self).map_err(|_| ConfigError::AlreadyInstalled)?;
        GLOBAL.get().ok_or(ConfigError::AlreadyInstalled)
    }

    /// Per-request timeout for CRUD calls.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Returns the first key in `keys` that has a non-empty value.
fn first_set<F>(lookup: &F, keys: &[&'static str]) -> Option<(&'static str, String)>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter().find_map(|key| {
        lookup(key)
            .filter(|v| !v.trim().is_empty())
            .map(|v| (*key, v.trim().to_string()))
    })
}

/// Parses a value as `T`, returning `default` on missing or invalid input.
fn parse_value<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn validate_url(key: &'static str, value: &str, schemes: &[&str]) -> Result<String, ConfigError> {
    let url = Url::parse(value).map_err(|err| ConfigError::InvalidUrl {
        key,
        value: value.to_string(),
        reason: err.to_string(),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::InvalidUrl {
            key,
            value: value.to_string(),
            reason: format!("expected scheme {}", schemes.join(" or ")),
        });
    }
    Ok(value.to_string())
}
