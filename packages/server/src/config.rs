//! Server configuration read from environment variables.

use std::str::FromStr;
use std::time::Duration;

use crash_stats_cache::DEFAULT_TTL;
use crash_stats_source::DEFAULT_LIMIT;
use crash_stats_source::socrata::{DEFAULT_API_URL, DEFAULT_PAGE_SIZE, SocrataConfig};

/// Runtime configuration for [`crate::run_server`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to listen on (`PORT`).
    pub port: u16,
    /// Upstream dataset settings (`CRASH_STATS_API_URL`,
    /// `CRASH_STATS_APP_TOKEN`, `CRASH_STATS_PAGE_SIZE`).
    pub socrata: SocrataConfig,
    /// Maximum rows fetched per computation (`CRASH_STATS_LIMIT`).
    pub limit: u64,
    /// How long a computed result is served (`CRASH_STATS_CACHE_TTL_SECS`).
    pub cache_ttl: Duration,
    /// Pins the year that opens the YTD window
    /// (`CRASH_STATS_REFERENCE_YEAR`). Unset follows the current year.
    pub reference_year: Option<i32>,
    /// Compute the first result before binding (`CRASH_STATS_WARM`).
    pub warm: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            socrata: SocrataConfig::default(),
            limit: DEFAULT_LIMIT,
            cache_ttl: DEFAULT_TTL,
            reference_year: None,
            warm: false,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, applying defaults for
    /// anything unset or unparseable.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_var(&lookup, "PORT").unwrap_or(defaults.port),
            socrata: SocrataConfig {
                api_url: non_empty("CRASH_STATS_API_URL")
                    .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                app_token: non_empty("CRASH_STATS_APP_TOKEN"),
                page_size: parse_var(&lookup, "CRASH_STATS_PAGE_SIZE")
                    .unwrap_or(DEFAULT_PAGE_SIZE),
            },
            limit: parse_var(&lookup, "CRASH_STATS_LIMIT").unwrap_or(defaults.limit),
            cache_ttl: parse_var(&lookup, "CRASH_STATS_CACHE_TTL_SECS")
                .map_or(defaults.cache_ttl, Duration::from_secs),
            reference_year: parse_var(&lookup, "CRASH_STATS_REFERENCE_YEAR"),
            warm: non_empty("CRASH_STATS_WARM")
                .is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes")),
        }
    }
}

/// Parses `key` if set. Unparseable values are logged and ignored.
fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let value = lookup(key)?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse().map_or_else(
        |_| {
            log::warn!("Ignoring invalid {key}={value:?}, using default");
            None
        },
        Some,
    )
}
