use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::AppState;

mod auth;
mod error;
mod handlers;
mod routes;

pub use auth::{CurrentUser, USERNAME_COOKIE};
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::users())
        .merge(routes::posts())
        .merge(routes::journal())
        .merge(routes::media(&state))
        .layer(DefaultBodyLimit::max(state.upload_max_bytes))
        .with_state(state)
}
