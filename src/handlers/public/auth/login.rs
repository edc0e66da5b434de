use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{generate_jwt, session_cookie, Claims};
use crate::config;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::services::TenantService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: u64,
    pub user: User,
}

/// POST /auth/login - Verify credentials, return a session token and set the session cookie
pub async fn post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let user = TenantService::new(state.pool.clone()).login(&email, &password).await?;

    let security = &config::config().security;
    let claims = Claims::for_user(&user, security.jwt_expiry_hours);
    let token = generate_jwt(&claims, &security.jwt_secret)?;
    let cookie = session_cookie(security, &token);

    tracing::info!("User {} logged in", user.email);

    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::success(LoginResponse {
            token,
            expires_in: security.jwt_expiry_hours * 3600,
            user,
        }),
    ))
}
