use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fc_core::{CacheKey, FeedItem};
use tokio::sync::RwLock;
use tokio::time::Instant;

/// A cached result set and the moment it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    items: Arc<[FeedItem]>,
    fetched_at: Instant,
    generation: u64,
}

impl CacheEntry {
    pub fn new(items: Vec<FeedItem>, fetched_at: Instant) -> Self {
        Self {
            items: Arc::from(items),
            fetched_at,
            generation: 0,
        }
    }

    /// Shared read-only view of the items.
    pub fn items(&self) -> Arc<[FeedItem]> {
        self.items.clone()
    }

    pub fn fetched_at(&self) -> Instant {
        self.fetched_at
    }

    /// Distinct for every `store` call; 0 until the entry has been stored.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

/// Key → entry map. Entries are only ever replaced whole; staleness never
/// evicts anything on its own.
#[derive(Debug)]
pub struct CacheStore {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    generations: AtomicU64,
}

impl CacheStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            generations: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    /// Returns the entry only if it is still within the TTL.
    pub async fn lookup_fresh(&self, key: &CacheKey) -> Option<CacheEntry> {
        let now = Instant::now();
        self.lookup(key)
            .await
            .filter(|entry| entry.is_fresh(self.ttl, now))
    }

    pub fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.is_fresh(self.ttl, Instant::now())
    }

    pub async fn store(&self, key: CacheKey, mut entry: CacheEntry) {
        entry.generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries.write().await.insert(key, entry);
    }

    /// Drops every key variant belonging to `user`; returns how many went.
    pub async fn invalidate_user(&self, user: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.belongs_to(user));
        before - entries.len()
    }

    pub async fn invalidate_all(&self) -> usize {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{book, codes};

    fn key(user: &str, books: &[&str]) -> CacheKey {
        CacheKey::new(user, &codes(books), &[], 10)
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_goes_stale_after_ttl() {
        let store = CacheStore::new(Duration::from_secs(60));
        let k = key("u", &["fiction"]);
        store
            .store(k.clone(), CacheEntry::new(vec![book("a", "2024", "fiction")], Instant::now()))
            .await;

        assert!(store.lookup_fresh(&k).await.is_some());

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(store.lookup_fresh(&k).await.is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(store.lookup_fresh(&k).await.is_none());
        // Stale entries stay until replaced or invalidated.
        let stale = store.lookup(&k).await.unwrap();
        assert!(!store.is_fresh(&stale));
        assert_eq!(stale.items().len(), 1);
    }

    #[tokio::test]
    async fn test_store_replaces_whole_entry() {
        let store = CacheStore::new(Duration::from_secs(60));
        let k = key("u", &["fiction"]);
        store
            .store(k.clone(), CacheEntry::new(vec![book("a", "1", "fiction"), book("b", "2", "fiction")], Instant::now()))
            .await;
        store
            .store(k.clone(), CacheEntry::new(vec![book("c", "3", "fiction")], Instant::now()))
            .await;

        let entry = store.lookup(&k).await.unwrap();
        assert_eq!(entry.generation(), 2);
        let items = entry.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link, "c");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalidate_user_removes_all_variants() {
        let store = CacheStore::new(Duration::from_secs(60));
        for k in [
            key("alice", &["fiction"]),
            key("alice", &["history", "poetry"]),
            CacheKey::new("alice", &[], &codes(&["cs.AI"]), 5),
            key("bob", &["fiction"]),
            key("alice2", &["fiction"]),
        ] {
            store.store(k, CacheEntry::new(Vec::new(), Instant::now())).await;
        }

        assert_eq!(store.invalidate_user("alice").await, 3);
        assert_eq!(store.len().await, 2);
        assert!(store.lookup(&key("bob", &["fiction"])).await.is_some());
        assert!(store.lookup(&key("alice2", &["fiction"])).await.is_some());

        // Idempotent.
        assert_eq!(store.invalidate_user("alice").await, 0);

        assert_eq!(store.invalidate_all().await, 2);
        assert!(store.is_empty().await);
    }
}
