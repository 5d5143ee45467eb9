// Handlers module
// HTTP handlers rendering the site's pages

pub mod posts;
pub mod users;

use askama::Template;
use axum::{
    extract::{OriginalUri, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// Health check handler
/// Reports whether the store answers, for monitoring purposes
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.repo().health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok", "database": "ok" }))),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "unavailable" })),
            )
        }
    }
}

/// Fallback for paths no route matches
pub async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::not_found(uri.path().to_string())
}

/// Characters escaped inside a single path segment; also covers HTML
/// specials so the result can go into an attribute unescaped.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'\'')
    .add(b'&')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

pub fn profile_url(username: &str) -> String {
    match username {
        // Browsers collapse bare dot segments
        "." => "/profile/%2E/".to_string(),
        ".." => "/profile/%2E%2E/".to_string(),
        _ => format!("/profile/{}/", utf8_percent_encode(username, PATH_SEGMENT)),
    }
}

pub fn post_url(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

/// `302 Found` redirect.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

pub(crate) fn render<T: Template>(template: T) -> Result<Response, AppError> {
    Ok(Html(template.render()?).into_response())
}

/// Numeric path segment; anything else is treated as a missing page.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::not_found(format!("{} {}", what, raw)))
}
