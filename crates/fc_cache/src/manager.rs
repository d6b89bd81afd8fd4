use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use fc_core::{CacheKey, FeedItem, SourceFetcher};
use tokio::sync::Mutex as TokioMutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::config::CacheConfig;
use crate::fanout::FetchCoordinator;
use crate::store::{CacheEntry, CacheStore};

/// The refresh result left behind for callers queued on the same key.
type Outcome = Option<Arc<[FeedItem]>>;
type FlightMap = StdMutex<HashMap<CacheKey, Arc<TokioMutex<Outcome>>>>;

/// Serves per-user feeds from a TTL cache, refreshing from both providers on
/// a miss. Construct once and share it behind an `Arc`.
pub struct CacheManager {
    store: CacheStore,
    catalog: FetchCoordinator,
    research: FetchCoordinator,
    config: CacheConfig,
    in_flight: FlightMap,
}

/// Membership in a key's single-flight queue. Leaving the queue (including by
/// cancellation) removes the key's lock once nobody else holds it.
struct Flight<'a> {
    map: &'a FlightMap,
    key: CacheKey,
    lock: Arc<TokioMutex<Outcome>>,
}

impl<'a> Flight<'a> {
    fn join(map: &'a FlightMap, key: &CacheKey) -> Self {
        let mut flights = map.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = flights.entry(key.clone()).or_default().clone();
        Self {
            map,
            key: key.clone(),
            lock,
        }
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let mut flights = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        let ours = flights
            .get(&self.key)
            .is_some_and(|lock| Arc::ptr_eq(lock, &self.lock));
        // One reference in the map, one here: nobody else is queued.
        if ours && Arc::strong_count(&self.lock) <= 2 {
            flights.remove(&self.key);
        }
    }
}

impl CacheManager {
    pub fn new(
        catalog: Arc<dyn SourceFetcher>,
        research: Arc<dyn SourceFetcher>,
        config: CacheConfig,
    ) -> Self {
        Self {
            store: CacheStore::new(config.ttl),
            catalog: FetchCoordinator::new(catalog, config.fetch_timeout),
            research: FetchCoordinator::new(research, config.fetch_timeout),
            config,
            in_flight: StdMutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// `get_feeds` with the configured default per-category bound.
    pub async fn get_feeds_default(
        &self,
        user: &str,
        book_categories: &[String],
        research_topics: &[String],
    ) -> Arc<[FeedItem]> {
        self.get_feeds(user, book_categories, research_topics, self.config.default_max_results)
            .await
    }

    /// Returns the merged feed for a selection. Never fails: provider errors
    /// only shrink the result.
    pub async fn get_feeds(
        &self,
        user: &str,
        book_categories: &[String],
        research_topics: &[String],
        max_results: usize,
    ) -> Arc<[FeedItem]> {
        let key = CacheKey::new(user, book_categories, research_topics, max_results);

        if let Some(entry) = self.store.lookup_fresh(&key).await {
            debug!(%key, "cache hit");
            return entry.items();
        }
        let seen = self.store.lookup(&key).await.map(|e| e.generation());

        let flight = Flight::join(&self.in_flight, &key);
        let mut turn = flight.lock.lock().await;

        // Whoever held the lock before us finished a refresh, stored or not.
        if let Some(items) = turn.as_ref() {
            debug!(%key, "sharing a concurrent refresh");
            return items.clone();
        }
        let current = self.store.lookup(&key).await;
        if let Some(entry) = &current {
            if Some(entry.generation()) != seen {
                debug!(%key, "refreshed by a concurrent caller");
                return entry.items();
            }
        }

        let items = self.refresh(&key, current).await;
        *turn = Some(items.clone());
        items
    }

    async fn refresh(&self, key: &CacheKey, previous: Option<CacheEntry>) -> Arc<[FeedItem]> {
        info!(%key, "refreshing feed");
        let started = Instant::now();

        let (books, papers) = tokio::join!(
            self.catalog.fan_out(key.book_categories(), key.max_results()),
            self.research.fan_out(key.research_topics(), key.max_results()),
        );

        let attempted = books.attempted + papers.attempted;
        let failed = books.failed + papers.failed;
        if attempted > 0 && failed == attempted {
            // Nothing usable came back; keep whatever we had.
            return match previous {
                Some(stale) if self.config.serve_stale_on_failure => {
                    warn!(%key, "all {} fetches failed, serving stale feed", attempted);
                    stale.items()
                }
                _ => {
                    warn!(%key, "all {} fetches failed", attempted);
                    Arc::from(Vec::new())
                }
            };
        }

        let items = aggregate(books.items, papers.items);
        info!(
            %key,
            "fetched {} items ({} failed of {}) in {:?}",
            items.len(),
            failed,
            attempted,
            started.elapsed()
        );

        let entry = CacheEntry::new(items, Instant::now());
        let view = entry.items();
        self.store.store(key.clone(), entry).await;
        view
    }

    /// Drops one user's entries (every selection variant), or everything.
    pub async fn invalidate(&self, user: Option<&str>) {
        match user {
            Some(user) => {
                let removed = self.store.invalidate_user(user).await;
                info!(user, "invalidated {} cache entries", removed);
            }
            None => {
                let removed = self.store.invalidate_all().await;
                info!("cleared cache ({} entries)", removed);
            }
        }
    }
}
