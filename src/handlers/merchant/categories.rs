use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::catalog::CategoryGroup;
use crate::config;
use crate::database::models::Category;
use crate::middleware::{ApiResponse, ApiResult, CurrentTenant};
use crate::services::category_service::{CreateCategory, UpdateCategory};
use crate::services::CategoryService;
use crate::AppState;

/// GET /api/merchant/categories
pub async fn list(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::success(CategoryService::new(state.pool.clone()).list(tenant.id).await?))
}

/// GET /api/merchant/categories/tree
pub async fn tree(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
) -> ApiResult<Vec<CategoryGroup>> {
    Ok(ApiResponse::success(CategoryService::new(state.pool.clone()).tree(tenant.id).await?))
}

/// POST /api/merchant/categories
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    payload: Result<Json<CreateCategory>, JsonRejection>,
) -> ApiResult<Category> {
    let Json(input) = payload?;
    let max_depth = config::config().catalog.max_category_depth;
    let category = CategoryService::new(state.pool.clone())
        .create(tenant.id, input, max_depth)
        .await?;
    Ok(ApiResponse::created(category))
}

/// PUT /api/merchant/categories/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateCategory>, JsonRejection>,
) -> ApiResult<Category> {
    let Json(input) = payload?;
    let category = CategoryService::new(state.pool.clone()).update(tenant.id, id, input).await?;
    Ok(ApiResponse::success(category))
}

/// DELETE /api/merchant/categories/:id - 409 while it has children or products
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    CategoryService::new(state.pool.clone()).delete(tenant.id, id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
