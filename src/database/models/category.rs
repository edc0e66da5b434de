use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub url: String,
    pub slug: String,
    pub icon_size: Vec<i32>,
    pub icon_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
