//! On-disk cache: one `<key>.json` file per entry, aged by its mtime.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::fs;
use tracing::debug;

use super::{CacheStore, StoreError, StoreResult};
use crate::models::cache::is_stale;

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$TMPDIR/news-cache`
    pub fn default_dir() -> PathBuf {
        std::env::temp_dir().join("news-cache")
    }

    #[cfg(test)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(".{key}.{}.{seq}.tmp", std::process::id()))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl CacheStore for FileStore {
    async fn get_fresh(&self, key: &str, ttl: Duration) -> StoreResult<Option<String>> {
        let path = self.entry_path(key);

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };
        let modified: DateTime<Utc> = metadata
            .modified()
            .map_err(|e| io_error(&path, e))?
            .into();

        if is_stale(modified, ttl) {
            debug!(key, %modified, "removing stale cache file");
            self.delete(key).await?;
            return Ok(None);
        }

        match fs::read_to_string(&path).await {
            Ok(payload) => Ok(Some(payload)),
            // Deleted by a concurrent request between stat and read.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn set(&self, key: &str, payload: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let temp_path = self.temp_path(key);
        let path = self.entry_path(key);

        fs::write(&temp_path, payload)
            .await
            .map_err(|e| io_error(&temp_path, e))?;

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(io_error(&path, e));
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let path = self.entry_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}
