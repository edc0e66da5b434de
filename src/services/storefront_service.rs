use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{BrandService, CategoryService, ServiceError, SpecGroupService};
use crate::catalog::{build_category_tree, build_spec_table, category_path, CategoryGroup, PathEntry, SpecTableGroup};
use crate::database::models::{Brand, Category, Product, SpecGroup};

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub category: CategoryRef,
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    name: String,
    category_id: Uuid,
    category_name: String,
}

/// Everything a product detail page shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub id: Uuid,
    pub name: String,
    pub desc: Option<String>,
    pub images: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub sale_price: Option<Decimal>,
    pub special_features: Vec<String>,
    pub is_available: bool,
    pub category_id: Uuid,
    pub specifications: Vec<SpecTableGroup>,
    pub path: Vec<PathEntry>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: Uuid,
    pub name: String,
    pub images: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub sale_price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRequest {
    pub product_ids: Option<Vec<Uuid>>,
}

/// Assemble the detail page from the product and the tenant's catalog tables
pub fn product_page(
    product: Product,
    categories: &[Category],
    groups: &[SpecGroup],
    max_path_hops: usize,
) -> ProductPage {
    ProductPage {
        path: category_path(categories, product.category_id, max_path_hops),
        specifications: build_spec_table(&product.specs, groups),
        id: product.id,
        name: product.name,
        desc: product.description,
        images: product.images,
        price: product.price,
        sale_price: product.sale_price,
        special_features: product.special_features,
        is_available: product.is_available,
        category_id: product.category_id,
    }
}

/// Read-only catalog views for shoppers, scoped by the tenant behind a store slug
pub struct StorefrontService {
    pool: PgPool,
}

impl StorefrontService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn categories(&self, tenant_id: Uuid) -> Result<Vec<Category>, ServiceError> {
        CategoryService::new(self.pool.clone()).list(tenant_id).await
    }

    pub async fn category_tree(&self, tenant_id: Uuid) -> Result<Vec<CategoryGroup>, ServiceError> {
        Ok(build_category_tree(&self.categories(tenant_id).await?))
    }

    pub async fn brands(&self, tenant_id: Uuid) -> Result<Vec<Brand>, ServiceError> {
        BrandService::new(self.pool.clone()).list(tenant_id).await
    }

    pub async fn products(&self, tenant_id: Uuid) -> Result<Vec<ProductSummary>, ServiceError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT p.id, p.name, c.id AS category_id, c.name AS category_name
            FROM products p
            JOIN categories c ON c.id = p.category_id
            WHERE p.tenant_id = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ProductSummary {
                id: row.id,
                name: row.name,
                category: CategoryRef {
                    id: row.category_id,
                    name: row.category_name,
                },
            })
            .collect())
    }

    /// Products of other stores are reported as missing
    pub async fn product(&self, tenant_id: Uuid, id: Uuid, max_path_hops: usize) -> Result<ProductPage, ServiceError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let categories = self.categories(tenant_id).await?;
        let groups = SpecGroupService::new(self.pool.clone()).list(tenant_id).await?;

        Ok(product_page(product, &categories, &groups, max_path_hops))
    }

    pub async fn cart(&self, tenant_id: Uuid, request: CartRequest) -> Result<Vec<CartItem>, ServiceError> {
        let product_ids = request.product_ids.unwrap_or_default();
        if product_ids.is_empty() {
            return Err(ServiceError::BadRequest("productIds must not be empty".to_string()));
        }

        let items = sqlx::query_as::<_, CartItem>(
            "SELECT id, name, images, price, sale_price FROM products WHERE id = ANY($1) AND tenant_id = $2",
        )
        .bind(&product_ids)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}
