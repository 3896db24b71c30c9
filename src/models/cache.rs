use chrono::{DateTime, Duration, Utc};

#[derive(Clone, Debug)]
pub struct CacheEntry<T> {
    pub value: T,
    pub stored_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T) -> Self {
        Self::stored_at(value, Utc::now())
    }

    pub fn stored_at(value: T, stored_at: DateTime<Utc>) -> Self {
        Self { value, stored_at }
    }

    pub fn is_stale(&self, ttl: Duration) -> bool {
        is_stale(self.stored_at, ttl)
    }
}

/// An entry is stale once its age exceeds `ttl`. Timestamps in the future
/// count as age zero.
pub fn is_stale(stored_at: DateTime<Utc>, ttl: Duration) -> bool {
    Utc::now() - stored_at > ttl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_is_not_stale() {
        let entry = CacheEntry::new("payload");
        assert!(!entry.is_stale(Duration::seconds(300)));
    }

    #[test]
    fn entry_older_than_ttl_is_stale() {
        let entry = CacheEntry::stored_at("payload", Utc::now() - Duration::seconds(301));
        assert!(entry.is_stale(Duration::seconds(300)));
    }

    #[test]
    fn future_timestamp_is_fresh() {
        let entry = CacheEntry::stored_at("payload", Utc::now() + Duration::seconds(60));
        assert!(!entry.is_stale(Duration::seconds(300)));
    }
}
