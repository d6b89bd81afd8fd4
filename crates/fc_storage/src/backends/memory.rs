use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use fc_core::{Error, Favourite, NewFavourite, PreferenceStore, Result, Selections};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct UserRecord {
    selections: Selections,
    favourites: Vec<Favourite>,
}

#[derive(Debug, Default)]
struct MemoryStore {
    users: HashMap<String, UserRecord>,
}

impl MemoryStore {
    fn user(&self, user: &str) -> Result<&UserRecord> {
        self.users
            .get(user)
            .ok_or_else(|| Error::NotFound(format!("user {}", user)))
    }

    fn user_mut(&mut self, user: &str) -> Result<&mut UserRecord> {
        self.users
            .get_mut(user)
            .ok_or_else(|| Error::NotFound(format!("user {}", user)))
    }

    /// Selection writes create the user, mirroring sign-up followed by the
    /// first category pick.
    fn user_or_insert(&mut self, user: &str) -> &mut UserRecord {
        self.users.entry(user.to_string()).or_default()
    }
}

/// Process-local preference store; contents vanish on restart.
#[derive(Clone, Default)]
pub struct MemoryPreferenceStore {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn clean(codes: Vec<String>) -> Vec<String> {
    let mut codes: Vec<String> = codes
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    codes.sort();
    codes.dedup();
    codes
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn create_user(&self, user: &str) -> Result<()> {
        let mut store = self.store.write().await;
        if store.users.contains_key(user) {
            return Err(Error::InvalidInput(format!("user {} already exists", user)));
        }
        store.user_or_insert(user);
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<String>> {
        let store = self.store.read().await;
        let mut users: Vec<String> = store.users.keys().cloned().collect();
        users.sort();
        Ok(users)
    }

    async fn selections(&self, user: &str) -> Result<Selections> {
        let store = self.store.read().await;
        Ok(store.user(user)?.selections.clone())
    }

    async fn set_book_categories(&self, user: &str, categories: Vec<String>) -> Result<()> {
        let mut store = self.store.write().await;
        store.user_or_insert(user).selections.book_categories = clean(categories);
        Ok(())
    }

    async fn set_research_topics(&self, user: &str, topics: Vec<String>) -> Result<()> {
        let mut store = self.store.write().await;
        store.user_or_insert(user).selections.research_topics = clean(topics);
        Ok(())
    }

    async fn favourites(&self, user: &str) -> Result<Vec<Favourite>> {
        let store = self.store.read().await;
        Ok(store.user(user)?.favourites.clone())
    }

    async fn add_favourite(&self, user: &str, favourite: NewFavourite) -> Result<(Favourite, bool)> {
        let mut store = self.store.write().await;
        let record = store.user_mut(user)?;

        if let Some(existing) = record
            .favourites
            .iter()
            .find(|f| f.link == favourite.link && f.title == favourite.title)
        {
            return Ok((existing.clone(), false));
        }

        let stored = Favourite {
            id: Uuid::new_v4().to_string(),
            title: favourite.title,
            kind: favourite.kind,
            link: favourite.link,
            date_published: favourite.date_published,
        };
        debug!(user, id = %stored.id, "added favourite");
        record.favourites.push(stored.clone());
        Ok((stored, true))
    }

    async fn remove_favourite(&self, user: &str, id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.user_mut(user)?.favourites.retain(|f| f.id != id);
        Ok(())
    }

    async fn delete_user(&self, user: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store
            .users
            .remove(user)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("user {}", user)))
    }
}
