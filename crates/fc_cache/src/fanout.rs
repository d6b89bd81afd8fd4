use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use fc_core::{Error, FeedItem, Result, SourceFetcher};
use futures::future::join_all;
use futures::FutureExt;
use tracing::{debug, warn};

/// Outcome of one fan-out: items in input order plus failure accounting.
#[derive(Debug, Default)]
pub struct FanOut {
    pub items: Vec<FeedItem>,
    pub attempted: usize,
    pub failed: usize,
}

impl FanOut {
    /// True when there was work to do and none of it succeeded.
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.failed == self.attempted
    }
}

/// Runs one fetch per code for a single provider, all at once.
#[derive(Clone)]
pub struct FetchCoordinator {
    fetcher: Arc<dyn SourceFetcher>,
    timeout: Duration,
}

impl FetchCoordinator {
    pub fn new(fetcher: Arc<dyn SourceFetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    /// Every task's outcome is captured on its own: an error, a timeout or a
    /// panic contributes nothing and leaves its siblings running. Dropping the
    /// returned future drops all in-flight requests with it.
    pub async fn fan_out(&self, codes: &[String], max_results: usize) -> FanOut {
        if codes.is_empty() {
            return FanOut::default();
        }

        debug!(
            provider = self.fetcher.name(),
            kind = %self.fetcher.kind(),
            "Fanning out {} fetches",
            codes.len()
        );
        let outcomes = join_all(codes.iter().map(|code| self.fetch_one(code, max_results))).await;

        let mut result = FanOut {
            attempted: codes.len(),
            ..FanOut::default()
        };
        for outcome in outcomes {
            match outcome {
                Some(items) => result.items.extend(items),
                None => result.failed += 1,
            }
        }
        result
    }

    async fn fetch_one(&self, code: &str, max_results: usize) -> Option<Vec<FeedItem>> {
        match self.guarded_fetch(code, max_results).await {
            Ok(items) => Some(items),
            Err(e) => {
                warn!(
                    provider = self.fetcher.name(),
                    kind = %self.fetcher.kind(),
                    code,
                    "fetch failed: {}",
                    e
                );
                None
            }
        }
    }

    /// One provider call under the coordinator's deadline. A panic inside the
    /// fetcher comes back as an error.
    async fn guarded_fetch(&self, code: &str, max_results: usize) -> Result<Vec<FeedItem>> {
        let task = AssertUnwindSafe(self.fetcher.fetch(code, max_results)).catch_unwind();
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::External(anyhow::anyhow!(
                "{} fetch for {} panicked",
                self.fetcher.name(),
                code
            ))),
            Err(_) => Err(Error::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{book, codes, MockFetcher};
    use fc_core::SourceKind;

    fn coordinator(fetcher: &Arc<MockFetcher>) -> FetchCoordinator {
        FetchCoordinator::new(fetcher.clone(), Duration::from_secs(5))
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_codes_make_no_calls() {
        let fetcher = Arc::new(MockFetcher::new(SourceKind::Book));
        let out = coordinator(&fetcher).fan_out(&[], 10).await;
        assert!(out.items.is_empty());
        assert_eq!(out.attempted, 0);
        assert!(!out.all_failed());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_run_concurrently_in_input_order() {
        let fetcher = Arc::new(
            MockFetcher::new(SourceKind::Book)
                .with("a", vec![book("a1", "2024", "a")])
                .with("b", vec![book("b1", "2023", "b"), book("b2", "2022", "b")])
                .with("c", vec![book("c1", "2025", "c")]),
        );
        let out = coordinator(&fetcher).fan_out(&codes(&["a", "b", "c"]), 10).await;

        let links: Vec<_> = out.items.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(links, vec!["a1", "b1", "b2", "c1"]);
        assert_eq!(fetcher.calls(), 3);
        assert_eq!(fetcher.peak_in_flight(), 3);
        assert_eq!(out.failed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_isolated() {
        let fetcher = Arc::new(
            MockFetcher::new(SourceKind::Book)
                .with("ok1", vec![book("x", "1", "ok1")])
                .with("ok2", vec![book("y", "2", "ok2")])
                .failing("bad")
                .panicking("boom")
                .hanging("stuck"),
        );
        let out = coordinator(&fetcher)
            .fan_out(&codes(&["ok1", "bad", "boom", "stuck", "ok2"]), 10)
            .await;

        let links: Vec<_> = out.items.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(links, vec!["x", "y"]);
        assert_eq!(out.attempted, 5);
        assert_eq!(out.failed, 3);
        assert!(!out.all_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_and_panics_become_errors() {
        let fetcher = Arc::new(MockFetcher::new(SourceKind::Book).hanging("stuck").panicking("boom"));
        let coordinator = coordinator(&fetcher);

        let stuck = coordinator.guarded_fetch("stuck", 10).await;
        assert!(matches!(stuck, Err(Error::Timeout(d)) if d == Duration::from_secs(5)));
        let boom = coordinator.guarded_fetch("boom", 10).await;
        assert!(matches!(boom, Err(Error::External(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failed() {
        let fetcher = Arc::new(MockFetcher::new(SourceKind::Book).failing("a").failing("b"));
        let out = coordinator(&fetcher).fan_out(&codes(&["a", "b"]), 10).await;
        assert!(out.items.is_empty());
        assert!(out.all_failed());
    }
}
