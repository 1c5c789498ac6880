//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::TtlPolicy;
use crate::tasks::SyncCategory;

/// Default TMDb v3 API root.
pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Upstream movie database settings.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// API key sent as the `api_key` query parameter; empty disables upstream calls
    pub api_key: String,
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Catalog data loading settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Run a sync before the server starts accepting requests
    pub on_startup: bool,
    /// Pages fetched per category
    pub pages: u32,
    pub categories: Vec<SyncCategory>,
    /// Extra attempts per page after a failed fetch
    pub retries: u32,
    /// Movies enriched with details after the list sync
    pub details_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            on_startup: false,
            pages: 5,
            categories: SyncCategory::DEFAULT.to_vec(),
            retries: 2,
            details_limit: 50,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of entries the in-memory store can hold
    pub max_entries: usize,
    /// Expiry sweep interval
    pub cleanup_interval: Duration,
    /// Bound on every single store call
    pub store_timeout: Duration,
    pub tmdb: TmdbConfig,
    pub ttl: TtlPolicy,
    pub sync: SyncConfig,
    /// Pre-fetch trending and popular lists before serving
    pub warm_cache_on_startup: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 10000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `STORE_TIMEOUT_MS` - Store call bound in milliseconds (default: 2000)
    /// - `TMDB_API_KEY` - TMDb API key (default: empty)
    /// - `TMDB_BASE_URL` - TMDb API root (default: `https://api.themoviedb.org/3`)
    /// - `TMDB_TIMEOUT_SECS` - Upstream request timeout (default: 10)
    /// - `CACHE_TTL_<PREFIX>` - Per-category TTL override in seconds
    /// - `SYNC_ON_STARTUP` - Load catalog data before serving (default: false)
    /// - `SYNC_PAGES` - Pages per category (default: 5)
    /// - `SYNC_CATEGORIES` - Comma-separated list (default: popular,top_rated,trending)
    /// - `SYNC_RETRIES` - Retries per page (default: 2)
    /// - `SYNC_DETAILS_LIMIT` - Movies enriched with details per sync (default: 50)
    /// - `WARM_CACHE_ON_STARTUP` - Pre-fetch popular lists (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let categories = match lookup("SYNC_CATEGORIES") {
            Some(raw) => parse_categories(&raw),
            None => defaults.sync.categories.clone(),
        };

        Self {
            server_port: read(&lookup, "SERVER_PORT").unwrap_or(defaults.server_port),
            max_entries: read(&lookup, "MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cleanup_interval: read(&lookup, "CLEANUP_INTERVAL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
            store_timeout: read(&lookup, "STORE_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.store_timeout),
            tmdb: TmdbConfig {
                api_key: lookup("TMDB_API_KEY").unwrap_or_default(),
                base_url: lookup("TMDB_BASE_URL")
                    .filter(|url| !url.trim().is_empty())
                    .unwrap_or(defaults.tmdb.base_url),
                timeout: read(&lookup, "TMDB_TIMEOUT_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.tmdb.timeout),
            },
            ttl: TtlPolicy::from_lookup(&lookup),
            sync: SyncConfig {
                on_startup: read(&lookup, "SYNC_ON_STARTUP").unwrap_or(defaults.sync.on_startup),
                pages: read(&lookup, "SYNC_PAGES").unwrap_or(defaults.sync.pages),
                categories,
                retries: read(&lookup, "SYNC_RETRIES").unwrap_or(defaults.sync.retries),
                details_limit: read(&lookup, "SYNC_DETAILS_LIMIT")
                    .unwrap_or(defaults.sync.details_limit),
            },
            warm_cache_on_startup: read(&lookup, "WARM_CACHE_ON_STARTUP")
                .unwrap_or(defaults.warm_cache_on_startup),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            max_entries: 10_000,
            cleanup_interval: Duration::from_secs(60),
            store_timeout: Duration::from_millis(2000),
            tmdb: TmdbConfig::default(),
            ttl: TtlPolicy::new(),
            sync: SyncConfig::default(),
            warm_cache_on_startup: false,
        }
    }
}

/// Parses variable `name`; unparseable values are ignored with a warning.
fn read<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        warn!(variable = name, value = %raw, "ignoring invalid configuration value");
    }
    parsed
}

fn parse_categories(raw: &str) -> Vec<SyncCategory> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| match name.parse() {
            Ok(category) => Some(category),
            Err(err) => {
                warn!(category = name, error = %err, "ignoring unknown sync category");
                None
            }
        })
        .collect()
}
