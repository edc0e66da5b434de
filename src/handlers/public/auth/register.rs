use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::config;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::tenant_service::{validate_registration, RegisterRequest, Registration};
use crate::services::TenantService;
use crate::AppState;

/// POST /auth/register - Create a store and its first merchant account
///
/// Input is validated before any database work; a taken email or store
/// name comes back as 409.
pub async fn post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Registration> {
    let Json(request) = payload?;
    let merchant = validate_registration(&request, config::config().security.min_password_length)?;

    let registration = TenantService::new(state.pool.clone()).register(merchant).await?;
    Ok(ApiResponse::created(registration))
}
