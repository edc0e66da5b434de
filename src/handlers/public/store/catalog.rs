use axum::extract::{Path, State};

use super::store_tenant;
use crate::catalog::CategoryGroup;
use crate::database::models::{Brand, Category};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::StorefrontService;
use crate::AppState;

/// GET /store/:store/categories
pub async fn categories_get(State(state): State<AppState>, Path(store): Path<String>) -> ApiResult<Vec<Category>> {
    let tenant = store_tenant(&state, &store).await?;
    let categories = StorefrontService::new(state.pool.clone()).categories(tenant.id).await?;
    Ok(ApiResponse::success(categories))
}

/// GET /store/:store/categories/tree
pub async fn category_tree_get(
    State(state): State<AppState>,
    Path(store): Path<String>,
) -> ApiResult<Vec<CategoryGroup>> {
    let tenant = store_tenant(&state, &store).await?;
    let tree = StorefrontService::new(state.pool.clone()).category_tree(tenant.id).await?;
    Ok(ApiResponse::success(tree))
}

/// GET /store/:store/brands
pub async fn brands_get(State(state): State<AppState>, Path(store): Path<String>) -> ApiResult<Vec<Brand>> {
    let tenant = store_tenant(&state, &store).await?;
    let brands = StorefrontService::new(state.pool.clone()).brands(tenant.id).await?;
    Ok(ApiResponse::success(brands))
}
