use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fc_core::{Error, FeedItem, Result, SourceFetcher, SourceKind};

pub fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn book(link: &str, published: &str, category: &str) -> FeedItem {
    FeedItem {
        title: format!("Book {}", link),
        link: link.to_string(),
        summary: String::new(),
        published: published.to_string(),
        kind: SourceKind::Book,
        category: category.to_string(),
        authors: "Author".to_string(),
        thumbnail: None,
    }
}

pub fn paper(link: &str, published: &str, topic: &str) -> FeedItem {
    FeedItem {
        title: format!("Paper {}", link),
        link: link.to_string(),
        summary: String::new(),
        published: published.to_string(),
        kind: SourceKind::Research,
        category: topic.to_string(),
        authors: "Researcher".to_string(),
        thumbnail: None,
    }
}

/// Scripted fetcher that counts calls and records peak concurrency.
pub struct MockFetcher {
    kind: SourceKind,
    responses: HashMap<String, Vec<FeedItem>>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    hanging: HashSet<String>,
    delay: Duration,
    fail_all: AtomicBool,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockFetcher {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            responses: HashMap::new(),
            failing: HashSet::new(),
            panicking: HashSet::new(),
            hanging: HashSet::new(),
            delay: Duration::from_millis(50),
            fail_all: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, code: &str, items: Vec<FeedItem>) -> Self {
        self.responses.insert(code.to_string(), items);
        self
    }

    pub fn failing(mut self, code: &str) -> Self {
        self.failing.insert(code.to_string());
        self
    }

    pub fn panicking(mut self, code: &str) -> Self {
        self.panicking.insert(code.to_string());
        self
    }

    pub fn hanging(mut self, code: &str) -> Self {
        self.hanging.insert(code.to_string());
        self
    }

    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

}

#[async_trait]
impl SourceFetcher for MockFetcher {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, code: &str, max_results: usize) -> Result<Vec<FeedItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.hanging.contains(code) {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.contains(code) {
            panic!("provider blew up for {}", code);
        }
        if self.fail_all.load(Ordering::SeqCst) || self.failing.contains(code) {
            return Err(Error::Provider {
                provider: "mock".to_string(),
                status: 500,
            });
        }
        Ok(self
            .responses
            .get(code)
            .map(|items| items.iter().take(max_results).cloned().collect())
            .unwrap_or_default())
    }
}
