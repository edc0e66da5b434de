use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Brand;
use crate::middleware::{ApiResponse, ApiResult, CurrentTenant};
use crate::services::brand_service::BrandInput;
use crate::services::BrandService;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
) -> ApiResult<Vec<Brand>> {
    Ok(ApiResponse::success(BrandService::new(state.pool.clone()).list(tenant.id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    payload: Result<Json<BrandInput>, JsonRejection>,
) -> ApiResult<Brand> {
    let Json(input) = payload?;
    Ok(ApiResponse::created(BrandService::new(state.pool.clone()).create(tenant.id, input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    Path(id): Path<Uuid>,
    payload: Result<Json<BrandInput>, JsonRejection>,
) -> ApiResult<Brand> {
    let Json(input) = payload?;
    Ok(ApiResponse::success(
        BrandService::new(state.pool.clone()).update(tenant.id, id, input).await?,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    BrandService::new(state.pool.clone()).delete(tenant.id, id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
