//! Key-value stores backing the news cache.
//!
//! Stores hold serialized payloads addressed by an already-derived cache key
//! and answer reads with TTL semantics: an entry older than the TTL is
//! removed and reported as absent. The coordinator treats every store error
//! as a miss (reads) or a skipped write, so implementations report failures
//! rather than hiding them.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Duration;
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the payload stored under `key` if it is no older than `ttl`.
    /// Stale entries are deleted before returning `None`.
    async fn get_fresh(&self, key: &str, ttl: Duration) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, payload: &str) -> StoreResult<()>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}
