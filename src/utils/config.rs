use std::path::PathBuf;

use chrono::Duration;
use tracing::warn;

use crate::store::FileStore;

pub const DEFAULT_GNEWS_BASE_URL: &str = "https://gnews.io/api/v4";
pub const DEFAULT_CACHE_TTL_SECS: i64 = 300;
pub const MAX_CACHE_TTL_SECS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Fs,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gnews_api_key: Option<String>,
    pub gnews_base_url: String,
    pub cache_backend: CacheBackend,
    pub cache_dir: PathBuf,
    pub cache_ttl_secs: i64,
    pub upstream_timeout_secs: u64,
    pub bind_addr: String,
}

impl Config {
    pub fn init() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let cache_backend = match var("NEWS_CACHE_BACKEND").as_deref() {
            None | Some("fs") => CacheBackend::Fs,
            Some("memory") => CacheBackend::Memory,
            Some(other) => {
                warn!(value = other, "unknown NEWS_CACHE_BACKEND, using fs");
                CacheBackend::Fs
            }
        };

        Config {
            gnews_api_key: var("GNEWS_API_KEY"),
            gnews_base_url: var("GNEWS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GNEWS_BASE_URL.to_string()),
            cache_backend,
            cache_dir: var("NEWS_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(FileStore::default_dir),
            cache_ttl_secs: bounded_ttl(parse_or(
                "NEWS_CACHE_TTL_SECS",
                var("NEWS_CACHE_TTL_SECS"),
                DEFAULT_CACHE_TTL_SECS,
            )),
            upstream_timeout_secs: parse_or(
                "UPSTREAM_TIMEOUT_SECS",
                var("UPSTREAM_TIMEOUT_SECS"),
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            ),
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::seconds(self.cache_ttl_secs.clamp(0, MAX_CACHE_TTL_SECS))
    }
}

fn bounded_ttl(secs: i64) -> i64 {
    if secs < 0 {
        warn!(value = secs, "negative NEWS_CACHE_TTL_SECS, using default");
        DEFAULT_CACHE_TTL_SECS
    } else if secs > MAX_CACHE_TTL_SECS {
        warn!(value = secs, max = MAX_CACHE_TTL_SECS, "NEWS_CACHE_TTL_SECS too large, capping");
        MAX_CACHE_TTL_SECS
    } else {
        secs
    }
}

fn parse_or<T: std::str::FromStr + Copy>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(name, value = %raw, "invalid numeric setting, using default");
            default
        }),
    }
}
