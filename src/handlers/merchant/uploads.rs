use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};

use crate::config;
use crate::database::models::Product;
use crate::media::UploadTicket;
use crate::middleware::{ApiResponse, ApiResult, CurrentTenant};
use crate::services::upload_service::{CompleteRequest, DeleteImageRequest, DeletedImage, SignRequest};
use crate::services::UploadService;
use crate::AppState;

fn service(state: &AppState) -> UploadService {
    UploadService::new(state.pool.clone(), state.media.clone(), config::config().media.folder_root.clone())
}

/// POST /api/merchant/uploads/sign - Ticket for a direct browser upload
pub async fn sign(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    payload: Result<Json<SignRequest>, JsonRejection>,
) -> ApiResult<UploadTicket> {
    let Json(request) = payload?;
    Ok(ApiResponse::success(service(&state).sign(tenant.id, request).await?))
}

/// POST /api/merchant/uploads/complete - Attach an uploaded image to a product
pub async fn complete(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    payload: Result<Json<CompleteRequest>, JsonRejection>,
) -> ApiResult<Product> {
    let Json(request) = payload?;
    Ok(ApiResponse::success(service(&state).complete(tenant.id, request).await?))
}

/// POST /api/merchant/uploads/delete - Detach an image and delete it from the media host
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    payload: Result<Json<DeleteImageRequest>, JsonRejection>,
) -> ApiResult<DeletedImage> {
    let Json(request) = payload?;
    Ok(ApiResponse::success(service(&state).delete(tenant.id, request).await?))
}
