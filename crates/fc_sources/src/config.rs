use std::time::Duration;

use fc_core::{Error, Result};
use url::Url;

pub const DEFAULT_BOOKS_URL: &str = "https://www.googleapis.com/books/v1";
pub const DEFAULT_ARXIV_URL: &str = "http://export.arxiv.org/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub books_url: String,
    pub arxiv_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            books_url: DEFAULT_BOOKS_URL.to_string(),
            arxiv_url: DEFAULT_ARXIV_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("feedcache/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SourceConfig {
    pub fn with_books_url(mut self, url: &str) -> Self {
        self.books_url = url.to_string();
        self
    }

    pub fn with_arxiv_url(mut self, url: &str) -> Self {
        self.arxiv_url = url.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for base in [&self.books_url, &self.arxiv_url] {
            Url::parse(base).map_err(|e| Error::Config(format!("invalid base URL {}: {}", base, e)))?;
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("fetch timeout must be positive".to_string()));
        }
        Ok(())
    }
}
