pub mod aggregate;
pub mod config;
pub mod fanout;
pub mod manager;
pub mod store;

pub use aggregate::aggregate;
pub use config::CacheConfig;
pub use fanout::{FanOut, FetchCoordinator};
pub use manager::CacheManager;
pub use store::{CacheEntry, CacheStore};

pub mod prelude {
    pub use super::{CacheConfig, CacheManager};
    pub use fc_core::{CacheKey, FeedItem, SourceFetcher, SourceKind};
}

#[cfg(test)]
pub(crate) mod test_utils;
