use std::collections::HashSet;

use fc_core::FeedItem;

/// Merges both provider families into one feed.
///
/// Research entries are deduplicated by link (first occurrence wins) because
/// the same paper is often listed under several topics. Catalog items are kept
/// as-is. The result is ordered by the `published` text, newest first; this is
/// a plain string comparison, so it only behaves chronologically while
/// providers emit ISO-like dates.
pub fn aggregate(catalog: Vec<FeedItem>, research: Vec<FeedItem>) -> Vec<FeedItem> {
    let mut seen = HashSet::new();
    let mut combined = catalog;
    combined.extend(research.into_iter().filter(|item| seen.insert(item.link.clone())));

    // Stable, so equal dates keep their fetch order.
    combined.sort_by(|a, b| b.published.cmp(&a.published));
    combined
}
