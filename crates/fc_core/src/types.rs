use serde::{Deserialize, Serialize};
use std::fmt;

/// Which provider family an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Catalog item (Google Books volume).
    #[serde(rename = "book")]
    Book,
    /// Research entry (arXiv Atom entry).
    #[serde(rename = "arxiv")]
    Research,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Book => "book",
            SourceKind::Research => "arxiv",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an aggregated feed. `link` is the identity used for dedup.
///
/// `published` keeps the provider's own date text; ordering compares it as a
/// string, never as a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub category: String,
    pub authors: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl FeedItem {
    /// Key used to match an item against a user's favourites.
    pub fn favourite_key(&self) -> String {
        format!("{}_{}", self.link, self.title)
    }
}

/// Composite cache key: user, normalized category sets and the per-category
/// result bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    user: String,
    book_categories: Vec<String>,
    research_topics: Vec<String>,
    max_results: usize,
}

impl CacheKey {
    /// Category lists are sorted and deduplicated, so any permutation of the
    /// same selection yields the same key.
    pub fn new(
        user: &str,
        book_categories: &[String],
        research_topics: &[String],
        max_results: usize,
    ) -> Self {
        Self {
            user: user.to_string(),
            book_categories: normalize(book_categories),
            research_topics: normalize(research_topics),
            max_results,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn book_categories(&self) -> &[String] {
        &self.book_categories
    }

    pub fn research_topics(&self) -> &[String] {
        &self.research_topics
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn belongs_to(&self, user: &str) -> bool {
        self.user == user
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.user,
            self.book_categories.join(","),
            self.research_topics.join(","),
            self.max_results
        )
    }
}

fn normalize(codes: &[String]) -> Vec<String> {
    let mut codes = codes.to_vec();
    codes.sort();
    codes.dedup();
    codes
}
