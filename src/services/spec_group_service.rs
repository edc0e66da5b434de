use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ensure_owner, required_text, ServiceError};
use crate::database::models::SpecGroup;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecGroupInput {
    pub title: Option<String>,
    pub specs: Option<Vec<String>>,
}

/// Trimmed spec names with blanks removed, order kept
pub fn clean_spec_names(specs: Vec<String>) -> Vec<String> {
    specs
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub struct SpecGroupService {
    pool: PgPool,
}

impl SpecGroupService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, tenant_id: Uuid) -> Result<Vec<SpecGroup>, ServiceError> {
        let groups = sqlx::query_as::<_, SpecGroup>("SELECT * FROM spec_groups WHERE tenant_id = $1 ORDER BY title")
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(groups)
    }

    pub async fn owned(&self, tenant_id: Uuid, id: Uuid) -> Result<SpecGroup, ServiceError> {
        let group = sqlx::query_as::<_, SpecGroup>("SELECT * FROM spec_groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Spec group not found".to_string()))?;
        ensure_owner(group.tenant_id, tenant_id, "Spec group")?;
        Ok(group)
    }

    pub async fn create(&self, tenant_id: Uuid, input: SpecGroupInput) -> Result<SpecGroup, ServiceError> {
        let title = required_text("title", input.title.as_deref(), 1)?;
        let specs = clean_spec_names(input.specs.unwrap_or_default());

        let group = sqlx::query_as::<_, SpecGroup>(
            "INSERT INTO spec_groups (id, tenant_id, title, specs) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(&title)
        .bind(&specs)
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, input: SpecGroupInput) -> Result<SpecGroup, ServiceError> {
        let mut group = self.owned(tenant_id, id).await?;

        if let Some(title) = input.title.as_deref() {
            group.title = required_text("title", Some(title), 1)?;
        }
        if let Some(specs) = input.specs {
            group.specs = clean_spec_names(specs);
        }

        let group = sqlx::query_as::<_, SpecGroup>(
            "UPDATE spec_groups SET title = $3, specs = $4 WHERE id = $1 AND tenant_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&group.title)
        .bind(&group.specs)
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    /// Products keep their spec values; they drop out of the spec table
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        self.owned(tenant_id, id).await?;
        sqlx::query("DELETE FROM spec_groups WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
