use axum::extract::{Extension, Path, Query, State};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config;
use crate::middleware::{ApiResponse, ApiResult, CurrentTenant};
use crate::services::traffic_service::TrafficPage;
use crate::services::TrafficService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TrafficQuery {
    /// 1-based page number
    pub page: Option<i64>,
}

/// GET /api/merchant/traffic?page=N - Newest page visits, paged
pub async fn list(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    Query(query): Query<TrafficQuery>,
) -> ApiResult<TrafficPage> {
    let page_size = config::config().catalog.traffic_page_size;
    let page = TrafficService::new(state.pool.clone())
        .page(tenant.id, query.page.unwrap_or(1), page_size)
        .await?;
    Ok(ApiResponse::success(page))
}

/// DELETE /api/merchant/traffic/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    TrafficService::new(state.pool.clone()).delete(tenant.id, id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
