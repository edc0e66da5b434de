use axum::{http::header, response::IntoResponse};
use serde_json::json;

use crate::auth::clear_session_cookie;
use crate::config;
use crate::middleware::ApiResponse;

/// POST /auth/logout - Expire the session cookie
///
/// Tokens are stateless; a copy held elsewhere stays valid until it expires.
pub async fn post() -> impl IntoResponse {
    let cookie = clear_session_cookie(&config::config().security);
    ([(header::SET_COOKIE, cookie)], ApiResponse::success(json!({ "message": "Logged out" })))
}
