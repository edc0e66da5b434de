use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::store_tenant;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::storefront_service::{CartItem, CartRequest};
use crate::services::StorefrontService;
use crate::AppState;

/// POST /store/:store/cart - Resolve cart product ids to display lines
///
/// Ids that are unknown or belong to another store are left out.
pub async fn post(
    State(state): State<AppState>,
    Path(store): Path<String>,
    payload: Result<Json<CartRequest>, JsonRejection>,
) -> ApiResult<Vec<CartItem>> {
    let Json(request) = payload?;
    let tenant = store_tenant(&state, &store).await?;
    let items = StorefrontService::new(state.pool.clone()).cart(tenant.id, request).await?;
    Ok(ApiResponse::success(items))
}
