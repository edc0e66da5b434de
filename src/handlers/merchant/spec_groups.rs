use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::SpecGroup;
use crate::middleware::{ApiResponse, ApiResult, CurrentTenant};
use crate::services::spec_group_service::SpecGroupInput;
use crate::services::SpecGroupService;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
) -> ApiResult<Vec<SpecGroup>> {
    Ok(ApiResponse::success(SpecGroupService::new(state.pool.clone()).list(tenant.id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    payload: Result<Json<SpecGroupInput>, JsonRejection>,
) -> ApiResult<SpecGroup> {
    let Json(input) = payload?;
    Ok(ApiResponse::created(
        SpecGroupService::new(state.pool.clone()).create(tenant.id, input).await?,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    Path(id): Path<Uuid>,
    payload: Result<Json<SpecGroupInput>, JsonRejection>,
) -> ApiResult<SpecGroup> {
    let Json(input) = payload?;
    Ok(ApiResponse::success(
        SpecGroupService::new(state.pool.clone()).update(tenant.id, id, input).await?,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    SpecGroupService::new(state.pool.clone()).delete(tenant.id, id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
