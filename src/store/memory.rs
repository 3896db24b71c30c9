use async_trait::async_trait;
use chrono::Duration;
use dashmap::DashMap;
use tracing::debug;

use super::{CacheStore, StoreResult};
use crate::models::cache::CacheEntry;

/// Process-local store. Entries live until they are read stale or the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, CacheEntry<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert_entry(&self, key: &str, entry: CacheEntry<String>) {
        self.entries.insert(key.to_string(), entry);
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get_fresh(&self, key: &str, ttl: Duration) -> StoreResult<Option<String>> {
        match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_stale(ttl) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
        }

        // A concurrent `set` may have refreshed the entry since the check above.
        if self
            .entries
            .remove_if(key, |_, entry| entry.is_stale(ttl))
            .is_some()
        {
            debug!(key, "removed stale cache entry");
        }
        Ok(None)
    }

    async fn set(&self, key: &str, payload: &str) -> StoreResult<()> {
        self.insert_entry(key, CacheEntry::new(payload.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryStore::new();
        store.set("k", "v").await.unwrap();
        assert_eq!(
            store.get_fresh("k", Duration::seconds(300)).await.unwrap(),
            Some("v".to_string())
        );
    }

    #[tokio::test]
    async fn test_stale_entry_is_removed() {
        let store = MemoryStore::new();
        store.insert_entry(
            "k",
            CacheEntry::stored_at("v".to_string(), Utc::now() - Duration::seconds(301)),
        );

        assert!(store
            .get_fresh("k", Duration::seconds(300))
            .await
            .unwrap()
            .is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store.set("k", "v").await.unwrap();
        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();
        assert!(store.is_empty());
    }
}
