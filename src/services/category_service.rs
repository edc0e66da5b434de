use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{check_min_len, ensure_owner, required_text, ServiceError};
use crate::catalog::{build_category_tree, category_depth, slugify, CategoryGroup};
use crate::database::models::Category;

const UNCATEGORIZED: &str = "Uncategorized";
const MIN_TEXT: usize = 3;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    pub parent_id: Option<Uuid>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub icon_size: Option<Vec<i32>>,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub url: Option<String>,
    pub icon_size: Option<Vec<i32>>,
    pub icon_url: Option<String>,
}

fn check_icon_url(icon_url: Option<&str>) -> Result<Option<String>, ServiceError> {
    match icon_url.map(str::trim) {
        None | Some("") => Ok(None),
        Some(url) => {
            check_min_len("iconUrl", url, MIN_TEXT)?;
            Ok(Some(url.to_string()))
        }
    }
}

/// Reject a new child of `parent_id` that would sit below `max_depth`
pub fn check_nesting(rows: &[Category], parent_id: Uuid, max_depth: usize) -> Result<(), ServiceError> {
    let parent_depth = category_depth(rows, parent_id)
        .ok_or_else(|| ServiceError::NotFound("Parent category not found".to_string()))?;
    if parent_depth + 1 > max_depth {
        return Err(ServiceError::invalid(
            "parentId",
            format!("categories can be nested at most {} levels deep", max_depth),
        ));
    }
    Ok(())
}

pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, tenant_id: Uuid) -> Result<Vec<Category>, ServiceError> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE tenant_id = $1 ORDER BY created_at, name",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn tree(&self, tenant_id: Uuid) -> Result<Vec<CategoryGroup>, ServiceError> {
        let rows = self.list(tenant_id).await?;
        Ok(build_category_tree(&rows))
    }

    /// Fetch a category the tenant owns: 404 when missing, 403 when foreign
    pub async fn owned(&self, tenant_id: Uuid, id: Uuid) -> Result<Category, ServiceError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Category not found".to_string()))?;
        ensure_owner(category.tenant_id, tenant_id, "Category")?;
        Ok(category)
    }

    pub async fn create(
        &self,
        tenant_id: Uuid,
        input: CreateCategory,
        max_depth: usize,
    ) -> Result<Category, ServiceError> {
        let name = required_text("name", input.name.as_deref(), MIN_TEXT)?;
        let url = required_text("url", input.url.as_deref(), MIN_TEXT)?;
        let icon_url = check_icon_url(input.icon_url.as_deref())?;

        if let Some(parent_id) = input.parent_id {
            self.owned(tenant_id, parent_id).await?;
            let rows = self.list(tenant_id).await?;
            check_nesting(&rows, parent_id, max_depth)?;
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, tenant_id, parent_id, name, url, slug, icon_size, icon_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(input.parent_id)
        .bind(&name)
        .bind(&url)
        .bind(slugify(&name))
        .bind(input.icon_size.unwrap_or_default())
        .bind(icon_url)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Created category '{}' ({}) for tenant {}", category.name, category.id, tenant_id);
        Ok(category)
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateCategory) -> Result<Category, ServiceError> {
        let mut category = self.owned(tenant_id, id).await?;

        if let Some(name) = input.name.as_deref() {
            let name = required_text("name", Some(name), MIN_TEXT)?;
            category.slug = slugify(&name);
            category.name = name;
        }
        if let Some(url) = input.url.as_deref() {
            category.url = required_text("url", Some(url), MIN_TEXT)?;
        }
        if let Some(icon_size) = input.icon_size {
            category.icon_size = icon_size;
        }
        if input.icon_url.is_some() {
            category.icon_url = check_icon_url(input.icon_url.as_deref())?;
        }

        let updated = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $3, url = $4, slug = $5, icon_size = $6, icon_url = $7
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&category.name)
        .bind(&category.url)
        .bind(&category.slug)
        .bind(&category.icon_size)
        .bind(&category.icon_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a leaf category that no product uses
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        self.owned(tenant_id, id).await?;

        let (children,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if children > 0 {
            return Err(ServiceError::Conflict("It has child!".to_string()));
        }

        let (products,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if products > 0 {
            return Err(ServiceError::Conflict("Category still has products".to_string()));
        }

        // a concurrent insert still trips the foreign keys and maps to 409
        sqlx::query("DELETE FROM categories WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("Deleted category {} for tenant {}", id, tenant_id);
        Ok(())
    }

    /// The tenant's catch-all root category, created on first use
    pub async fn uncategorized(&self, tenant_id: Uuid) -> Result<Uuid, ServiceError> {
        let slug = slugify(UNCATEGORIZED);

        let existing: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM categories WHERE tenant_id = $1 AND slug = $2 AND parent_id IS NULL ORDER BY created_at LIMIT 1",
        )
        .bind(tenant_id)
        .bind(&slug)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((id,)) = existing {
            return Ok(id);
        }

        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO categories (id, tenant_id, name, url, slug) VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(UNCATEGORIZED)
        .bind(&slug)
        .bind(&slug)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Created '{}' category {} for tenant {}", UNCATEGORIZED, id, tenant_id);
        Ok(id)
    }
}
