use async_trait::async_trait;
use chrono::SecondsFormat;
use fc_core::{Error, FeedItem, Result, SourceFetcher, SourceKind};
use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::Client;
use tracing::debug;

use super::utils;
use crate::config::SourceConfig;

/// The query API refuses larger slices in one call.
const MAX_PAGE_SIZE: usize = 2000;

/// Research fetcher backed by the arXiv Atom query API.
#[derive(Debug, Clone)]
pub struct ArxivFetcher {
    client: Client,
    base_url: String,
}

impl ArxivFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: utils::build_client(config)?,
            base_url: config.arxiv_url.clone(),
        })
    }

    /// Same lower bound as the catalog: a zero request still asks for one entry.
    pub(crate) fn page_size(max_results: usize) -> usize {
        max_results.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Converts an Atom document into feed items tagged with `topic`.
pub fn parse_entries(body: &[u8], topic: &str) -> Result<Vec<FeedItem>> {
    let feed = parser::parse(body).map_err(|e| Error::Parse(format!("arXiv feed: {}", e)))?;
    Ok(feed
        .entries
        .into_iter()
        .map(|entry| entry_to_item(entry, topic))
        .collect())
}

fn entry_to_item(entry: Entry, topic: &str) -> FeedItem {
    let link = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("alternate"))
        .or_else(|| entry.links.first())
        .map(|l| l.href.clone())
        .unwrap_or_default();

    // arXiv stamps both; the submission date is the one users expect.
    let published = entry
        .published
        .or(entry.updated)
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default();

    FeedItem {
        title: entry
            .title
            .map(|t| utils::collapse_whitespace(&t.content))
            .unwrap_or_default(),
        link,
        summary: entry
            .summary
            .map(|s| s.content.trim().to_string())
            .unwrap_or_default(),
        published,
        kind: SourceKind::Research,
        category: topic.to_string(),
        authors: entry
            .authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        thumbnail: None,
    }
}

#[async_trait]
impl SourceFetcher for ArxivFetcher {
    fn kind(&self) -> SourceKind {
        SourceKind::Research
    }

    fn name(&self) -> &str {
        "arxiv"
    }

    async fn fetch(&self, code: &str, max_results: usize) -> Result<Vec<FeedItem>> {
        let url = utils::endpoint(&self.base_url, "query");
        debug!("Fetching arXiv entries for {}: {}", code, url);

        let query = [
            ("search_query", format!("cat:{}", code)),
            ("sortBy", "submittedDate".to_string()),
            ("sortOrder", "descending".to_string()),
            ("start", "0".to_string()),
            ("max_results", Self::page_size(max_results).to_string()),
        ];
        let response = self.client.get(&url).query(&query).send().await?;
        let response = utils::ensure_success(self.name(), response)?;
        let body = response.bytes().await?;

        let items = parse_entries(&body, code)?;
        debug!("Fetched {} arXiv entries for {}", items.len(), code);
        Ok(items)
    }
}
