pub mod error;
pub mod logging;
pub mod preferences;
pub mod source;
pub mod types;

pub use error::Error;
pub use preferences::{Favourite, NewFavourite, PreferenceStore, Selections};
pub use source::SourceFetcher;
pub use types::{CacheKey, FeedItem, SourceKind};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::source::SourceFetcher;
    pub use super::types::{CacheKey, FeedItem, SourceKind};
    pub use super::{Error, Result};
}
