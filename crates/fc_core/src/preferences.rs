use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A user's selected category codes for both provider families.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selections {
    pub book_categories: Vec<String>,
    pub research_topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favourite {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub link: String,
    pub date_published: String,
}

impl Favourite {
    pub fn key(&self) -> String {
        format!("{}_{}", self.link, self.title)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFavourite {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub link: String,
    pub date_published: String,
}

/// Record store for per-user selections and favourites. The feed cache only
/// ever reads `selections`; everything else serves the outer surfaces.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn create_user(&self, user: &str) -> Result<()>;

    async fn list_users(&self) -> Result<Vec<String>>;

    /// Fails with `Error::NotFound` for unknown users
    async fn selections(&self, user: &str) -> Result<Selections>;

    async fn set_book_categories(&self, user: &str, categories: Vec<String>) -> Result<()>;

    async fn set_research_topics(&self, user: &str, topics: Vec<String>) -> Result<()>;

    async fn favourites(&self, user: &str) -> Result<Vec<Favourite>>;

    /// Returns the stored favourite and whether it was newly created. Adding
    /// the same `(link, title)` twice returns the existing record.
    async fn add_favourite(&self, user: &str, favourite: NewFavourite) -> Result<(Favourite, bool)>;

    async fn remove_favourite(&self, user: &str, id: &str) -> Result<()>;

    /// Removes the user together with selections and favourites
    async fn delete_user(&self, user: &str) -> Result<()>;
}
