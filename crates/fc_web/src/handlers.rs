use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use fc_core::{FeedItem, NewFavourite, SourceKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::{ApiError, AppState};

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct FeedView {
    #[serde(flatten)]
    pub item: FeedItem,
    pub is_favorite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedsResponse {
    pub feed_items: Vec<FeedView>,
    pub last_updated: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectionUpdate {
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ViewedItem {
    pub url: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Copy)]
enum Scope {
    All,
    Books,
    Research,
}

async fn load_feed(state: &AppState, user: &str, scope: Scope) -> ApiResult<FeedsResponse> {
    let selections = state.preferences.selections(user).await?;
    let favourites: HashMap<String, String> = state
        .preferences
        .favourites(user)
        .await?
        .into_iter()
        .map(|f| (f.key(), f.id))
        .collect();

    let (books, topics, only) = match scope {
        Scope::All => (selections.book_categories, selections.research_topics, None),
        Scope::Books => (selections.book_categories, Vec::new(), Some(SourceKind::Book)),
        Scope::Research => (Vec::new(), selections.research_topics, Some(SourceKind::Research)),
    };
    let items = state.feeds.get_feeds_default(user, &books, &topics).await;

    let feed_items = items
        .iter()
        .filter(|item| only.map_or(true, |kind| item.kind == kind))
        .map(|item| {
            let favorite_id = favourites.get(&item.favourite_key()).cloned();
            FeedView {
                item: item.clone(),
                is_favorite: favorite_id.is_some(),
                favorite_id,
            }
        })
        .collect();

    Ok(FeedsResponse {
        feed_items,
        last_updated: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

pub async fn get_feeds(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<FeedsResponse>> {
    Ok(Json(load_feed(&state, &user, Scope::All).await?))
}

pub async fn get_book_feeds(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<FeedsResponse>> {
    Ok(Json(load_feed(&state, &user, Scope::Books).await?))
}

pub async fn get_research_feeds(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<FeedsResponse>> {
    Ok(Json(load_feed(&state, &user, Scope::Research).await?))
}

pub async fn refresh_feeds(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<FeedsResponse>> {
    state.feeds.invalidate(Some(&user)).await;
    Ok(Json(load_feed(&state, &user, Scope::All).await?))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    state.preferences.create_user(&user).await?;
    info!(user, "created user");
    Ok((StatusCode::CREATED, Json(json!({ "status": "ok" }))))
}

/// Every user with their favourites, for the admin overview.
pub async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let mut users = Vec::new();
    for user in state.preferences.list_users().await? {
        let favourites = state.preferences.favourites(&user).await?;
        users.push(json!({ "user": user, "favourites": favourites }));
    }
    Ok(Json(json!({ "users": users })))
}

pub async fn track_view(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Json(view): Json<ViewedItem>,
) -> ApiResult<Json<Value>> {
    state.preferences.selections(&user).await?;
    info!(user, kind = %view.kind, url = %view.url, "viewed {}", view.title);
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<Value>> {
    state.preferences.delete_user(&user).await?;
    state.feeds.invalidate(Some(&user)).await;
    info!(user, "deleted user");
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn select_books(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Json(update): Json<SelectionUpdate>,
) -> ApiResult<Json<Value>> {
    if update.categories.is_empty() {
        return Err(ApiError::bad_request("Please select at least one book category."));
    }
    state.preferences.set_book_categories(&user, update.categories).await?;
    state.feeds.invalidate(Some(&user)).await;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn select_research(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Json(update): Json<SelectionUpdate>,
) -> ApiResult<Json<Value>> {
    if update.categories.is_empty() {
        return Err(ApiError::bad_request("Please select at least one research category."));
    }
    state.preferences.set_research_topics(&user, update.categories).await?;
    state.feeds.invalidate(Some(&user)).await;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn list_favourites(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<Value>> {
    let favourites = state.preferences.favourites(&user).await?;
    Ok(Json(json!({ "favourites": favourites })))
}

pub async fn add_favourite(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Json(favourite): Json<NewFavourite>,
) -> ApiResult<Json<Value>> {
    let (stored, created) = state.preferences.add_favourite(&user, favourite).await?;
    let status = if created { "ok" } else { "exists" };
    Ok(Json(json!({ "status": status, "id": stored.id })))
}

pub async fn remove_favourite(
    State(state): State<Arc<AppState>>,
    Path((user, id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    state.preferences.remove_favourite(&user, &id).await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.feeds.invalidate(None).await;
    Json(json!({ "status": "ok" }))
}
