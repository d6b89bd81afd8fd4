use async_trait::async_trait;

use crate::types::{FeedItem, SourceKind};
use crate::Result;

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Returns the provider family this fetcher produces
    fn kind(&self) -> SourceKind;

    /// Returns a short provider name used in logs
    fn name(&self) -> &str;

    /// Fetches up to `max_results` items for one category or topic code
    async fn fetch(&self, code: &str, max_results: usize) -> Result<Vec<FeedItem>>;
}
