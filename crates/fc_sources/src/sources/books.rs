use async_trait::async_trait;
use fc_core::{FeedItem, Result, SourceFetcher, SourceKind};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::utils;
use crate::config::SourceConfig;

/// The volumes endpoint rejects larger page sizes.
pub const MAX_PAGE_SIZE: usize = 40;

/// Catalog fetcher backed by the Google Books volumes API.
#[derive(Debug, Clone)]
pub struct BooksFetcher {
    client: Client,
    base_url: String,
}

// ── Google Books response types ───────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Default, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VolumeInfo {
    title: String,
    info_link: String,
    description: String,
    published_date: String,
    authors: Vec<String>,
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImageLinks {
    thumbnail: Option<String>,
}

// ── Implementation ────────────────────────────────────────────────────

impl BooksFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: utils::build_client(config)?,
            base_url: config.books_url.clone(),
        })
    }

    pub(crate) fn page_size(max_results: usize) -> usize {
        max_results.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Converts a volumes response body into feed items tagged with `category`.
pub fn parse_volumes(body: &str, category: &str) -> Result<Vec<FeedItem>> {
    let response: VolumesResponse = serde_json::from_str(body)?;
    Ok(response
        .items
        .into_iter()
        .map(|volume| {
            let info = volume.volume_info;
            FeedItem {
                title: info.title,
                link: info.info_link,
                summary: info.description,
                published: info.published_date,
                kind: SourceKind::Book,
                category: category.to_string(),
                authors: info.authors.join(", "),
                thumbnail: info
                    .image_links
                    .and_then(|links| links.thumbnail)
                    .filter(|t| !t.is_empty()),
            }
        })
        .collect())
}

#[async_trait]
impl SourceFetcher for BooksFetcher {
    fn kind(&self) -> SourceKind {
        SourceKind::Book
    }

    fn name(&self) -> &str {
        "google-books"
    }

    async fn fetch(&self, code: &str, max_results: usize) -> Result<Vec<FeedItem>> {
        let url = utils::endpoint(&self.base_url, "volumes");
        debug!("Fetching books for {}: {}", code, url);

        let query = [
            ("q", format!("subject:{}", code)),
            ("orderBy", "newest".to_string()),
            ("maxResults", Self::page_size(max_results).to_string()),
        ];
        let response = self.client.get(&url).query(&query).send().await?;
        let response = utils::ensure_success(self.name(), response)?;
        let body = response.text().await?;

        let items = parse_volumes(&body, code)?;
        debug!("Fetched {} books for {}", items.len(), code);
        Ok(items)
    }
}
