use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Values for one spec group, positionally matching `SpecGroup::specs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSpec {
    pub spec_group_id: Uuid,
    pub spec_values: Vec<String>,
}

/// A catalog product. `images` and `images_public_ids` are parallel arrays.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub category_id: Uuid,
    pub brand_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub sale_price: Option<Decimal>,
    pub stock: Option<i32>,
    pub sku: Option<String>,
    pub is_available: bool,
    pub special_features: Vec<String>,
    pub images: Vec<String>,
    pub images_public_ids: Vec<String>,
    pub specs: Json<Vec<ProductSpec>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
