pub mod config;
pub mod sources;

pub use config::SourceConfig;
pub use sources::arxiv::ArxivFetcher;
pub use sources::books::BooksFetcher;

pub mod prelude {
    pub use super::config::SourceConfig;
    pub use super::sources::{arxiv::ArxivFetcher, books::BooksFetcher};
    pub use fc_core::{FeedItem, Result, SourceFetcher, SourceKind};
}
