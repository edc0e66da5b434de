use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::ServiceError;
use crate::database::models::PageVisit;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitInput {
    pub page_type: Option<String>,
    pub page_path: Option<String>,
    pub device_resolution: Option<String>,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficPage {
    pub list: Vec<PageVisit>,
    pub total_count: i64,
}

/// Row offset of a 1-based page; pages below 1 read as the first page
pub fn page_offset(page: i64, page_size: i64) -> Result<i64, ServiceError> {
    (page.max(1) - 1)
        .checked_mul(page_size)
        .ok_or_else(|| ServiceError::invalid("page", "is out of range"))
}

pub struct TrafficService {
    pool: PgPool,
}

impl TrafficService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, tenant_id: Uuid, visit: VisitInput) -> Result<PageVisit, ServiceError> {
        let page_type = visit
            .page_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::invalid("pageType", "is required"))?;

        let visit = sqlx::query_as::<_, PageVisit>(
            r#"
            INSERT INTO page_visits (id, tenant_id, page_type, page_path, device_resolution, product_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(page_type)
        .bind(visit.page_path)
        .bind(visit.device_resolution)
        .bind(visit.product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(visit)
    }

    /// Newest visits first
    pub async fn page(&self, tenant_id: Uuid, page: i64, page_size: i64) -> Result<TrafficPage, ServiceError> {
        let offset = page_offset(page, page_size)?;
        let list = sqlx::query_as::<_, PageVisit>(
            "SELECT * FROM page_visits WHERE tenant_id = $1 ORDER BY time DESC LIMIT $2 OFFSET $3",
        )
        .bind(tenant_id)
        .bind(page_size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let (total_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM page_visits WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(TrafficPage { list, total_count })
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM page_visits WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("Visit not found".to_string()));
        }
        Ok(())
    }
}
