use std::time::Duration;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_RESULTS: usize = 10;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entries younger than this are served without touching the providers.
    pub ttl: Duration,
    /// Per-category bound used when callers do not pass one.
    pub default_max_results: usize,
    /// Upper bound on a single fetch task, on top of the HTTP client timeout.
    pub fetch_timeout: Duration,
    /// Keep serving the last good feed when every fetch of a refresh fails.
    pub serve_stale_on_failure: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            default_max_results: DEFAULT_MAX_RESULTS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            serve_stale_on_failure: true,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_stale_fallback(mut self, enabled: bool) -> Self {
        self.serve_stale_on_failure = enabled;
        self
    }
}
