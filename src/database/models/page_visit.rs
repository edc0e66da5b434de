use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PageVisit {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub time: DateTime<Utc>,
    pub page_type: String,
    pub page_path: Option<String>,
    pub device_resolution: Option<String>,
    pub product_id: Option<Uuid>,
}
