use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::store_tenant;
use crate::database::models::PageVisit;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::traffic_service::VisitInput;
use crate::services::TrafficService;
use crate::AppState;

/// POST /store/:store/visits - Record a storefront page view
pub async fn post(
    State(state): State<AppState>,
    Path(store): Path<String>,
    payload: Result<Json<VisitInput>, JsonRejection>,
) -> ApiResult<PageVisit> {
    let Json(visit) = payload?;
    let tenant = store_tenant(&state, &store).await?;
    let visit = TrafficService::new(state.pool.clone()).record(tenant.id, visit).await?;
    Ok(ApiResponse::created(visit))
}
