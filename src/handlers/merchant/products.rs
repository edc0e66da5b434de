use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};
use uuid::Uuid;

use crate::config;
use crate::database::models::Product;
use crate::middleware::{ApiResponse, ApiResult, CurrentTenant};
use crate::services::product_service::{DeletedProduct, ProductInput, ProductPatch};
use crate::services::ProductService;
use crate::AppState;

fn service(state: &AppState) -> ProductService {
    ProductService::new(state.pool.clone(), state.media.clone(), config::config().media.folder_root.clone())
}

/// GET /api/merchant/products
pub async fn list(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
) -> ApiResult<Vec<Product>> {
    Ok(ApiResponse::success(service(&state).list(tenant.id).await?))
}

/// POST /api/merchant/products
///
/// Without a `categoryId` the product lands in the store's "Uncategorized"
/// category, which is created on first use.
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<Product> {
    let Json(input) = payload?;
    let product = service(&state).create(tenant.id, input).await?;
    Ok(ApiResponse::created(product))
}

/// GET /api/merchant/products/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    Path(id): Path<Uuid>,
) -> ApiResult<Product> {
    Ok(ApiResponse::success(service(&state).owned(tenant.id, id).await?))
}

/// PUT /api/merchant/products/:id - Apply the editable subset of fields
pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ProductPatch>, JsonRejection>,
) -> ApiResult<Product> {
    let Json(patch) = payload?;
    Ok(ApiResponse::success(service(&state).update(tenant.id, id, patch).await?))
}

/// DELETE /api/merchant/products/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedProduct> {
    Ok(ApiResponse::success(service(&state).delete(tenant.id, id).await?))
}
