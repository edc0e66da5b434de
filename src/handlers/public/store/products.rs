use axum::extract::{Path, State};
use uuid::Uuid;

use super::store_tenant;
use crate::config;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::storefront_service::{ProductPage, ProductSummary};
use crate::services::StorefrontService;
use crate::AppState;

/// GET /store/:store/products - Product names with their category
pub async fn list(State(state): State<AppState>, Path(store): Path<String>) -> ApiResult<Vec<ProductSummary>> {
    let tenant = store_tenant(&state, &store).await?;
    let products = StorefrontService::new(state.pool.clone()).products(tenant.id).await?;
    Ok(ApiResponse::success(products))
}

/// GET /store/:store/products/:id - Detail page with spec table and category path
pub async fn get(
    State(state): State<AppState>,
    Path((store, id)): Path<(String, Uuid)>,
) -> ApiResult<ProductPage> {
    let tenant = store_tenant(&state, &store).await?;
    let page = StorefrontService::new(state.pool.clone())
        .product(tenant.id, id, config::config().catalog.max_path_hops)
        .await?;
    Ok(ApiResponse::success(page))
}
