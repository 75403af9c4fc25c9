use axum::{routing::get, routing::post, Router};
use tower_http::services::ServeDir;

use crate::app::media::PUBLIC_PREFIX;
use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn users() -> Router<AppState> {
    Router::new().route("/users", post(handlers::create_user))
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route("/posts", get(handlers::timeline))
        .route("/posts", post(handlers::create_post))
        .route("/posts/:id", get(handlers::get_thread))
        .route("/posts/:id/tags", post(handlers::attach_tags))
        .route("/posts/:id/like", post(handlers::toggle_like))
}

pub fn journal() -> Router<AppState> {
    Router::new()
        .route("/journal", get(handlers::journal))
        .route("/journal", post(handlers::create_journal_post))
}

pub fn media(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/images", post(handlers::upload_image))
        .nest_service(PUBLIC_PREFIX, ServeDir::new(state.storage.root()))
}
