use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Template naming the specs a product of this kind lists, in order
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SpecGroup {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub title: String,
    pub specs: Vec<String>,
}
