use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::http::AppError;
use crate::AppState;

pub const USERNAME_COOKIE: &str = "username";

/// The requesting user's handle, as set by the login flow's `username` cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        username_for_request(parts)
            .map(|username| CurrentUser { username })
            .ok_or_else(|| AppError::unauthorized("login required"))
    }
}

pub fn username_for_request(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == USERNAME_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
