use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/users", get(handlers::list_users))
        .route("/api/users/:user", post(handlers::create_user).delete(handlers::delete_user))
        .route("/api/users/:user/feeds", get(handlers::get_feeds))
        .route("/api/users/:user/feeds/books", get(handlers::get_book_feeds))
        .route("/api/users/:user/feeds/research", get(handlers::get_research_feeds))
        .route("/api/users/:user/refresh", post(handlers::refresh_feeds))
        .route("/api/users/:user/books", put(handlers::select_books))
        .route("/api/users/:user/research", put(handlers::select_research))
        .route(
            "/api/users/:user/favourites",
            get(handlers::list_favourites).post(handlers::add_favourite),
        )
        .route("/api/users/:user/favourites/:id", delete(handlers::remove_favourite))
        .route("/api/users/:user/views", post(handlers::track_view))
        .route("/api/cache", delete(handlers::clear_cache))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::AppState;
    pub use fc_core::{Error, FeedItem, Result};
}
