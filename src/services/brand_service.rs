use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ensure_owner, required_text, ServiceError};
use crate::catalog::slugify;
use crate::database::models::Brand;

const MIN_NAME: usize = 3;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandInput {
    pub name: Option<String>,
}

pub struct BrandService {
    pool: PgPool,
}

impl BrandService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, tenant_id: Uuid) -> Result<Vec<Brand>, ServiceError> {
        let brands = sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE tenant_id = $1 ORDER BY name")
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(brands)
    }

    pub async fn owned(&self, tenant_id: Uuid, id: Uuid) -> Result<Brand, ServiceError> {
        let brand = sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Brand not found".to_string()))?;
        ensure_owner(brand.tenant_id, tenant_id, "Brand")?;
        Ok(brand)
    }

    pub async fn create(&self, tenant_id: Uuid, input: BrandInput) -> Result<Brand, ServiceError> {
        let name = required_text("name", input.name.as_deref(), MIN_NAME)?;

        let brand = sqlx::query_as::<_, Brand>(
            "INSERT INTO brands (id, tenant_id, name, slug) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(&name)
        .bind(slugify(&name))
        .fetch_one(&self.pool)
        .await?;

        Ok(brand)
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, input: BrandInput) -> Result<Brand, ServiceError> {
        self.owned(tenant_id, id).await?;
        let name = required_text("name", input.name.as_deref(), MIN_NAME)?;

        let brand = sqlx::query_as::<_, Brand>(
            "UPDATE brands SET name = $3, slug = $4 WHERE id = $1 AND tenant_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&name)
        .bind(slugify(&name))
        .fetch_one(&self.pool)
        .await?;

        Ok(brand)
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        self.owned(tenant_id, id).await?;

        let (products,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE brand_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if products > 0 {
            return Err(ServiceError::Conflict("Brand still has products".to_string()));
        }

        sqlx::query("DELETE FROM brands WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
