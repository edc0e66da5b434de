//! Offline repairs run from the `storeflex` binary. Every operation plans
//! first and only writes when `apply` is set.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::ServiceError;
use crate::database::models::{User, UserRole};
use crate::media::{public_id_from_url, MediaResource, MediaStore};

/// Tables whose rows carry a `tenant_id`
pub const TENANT_TABLES: [&str; 6] = ["users", "categories", "brands", "spec_groups", "products", "page_visits"];

const DEFAULT_TENANT_NAME: &str = "Default Store";
const DEFAULT_TENANT_SLUG: &str = "default";
const DEFAULT_TENANT_EMAIL: &str = "default@storeflex.local";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanReport {
    pub scanned: usize,
    pub referenced: usize,
    pub orphans: Vec<String>,
    pub deleted: usize,
    pub failed: usize,
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillChange {
    pub product_id: Uuid,
    pub before: Vec<String>,
    pub after: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillReport {
    pub scanned: usize,
    pub changes: Vec<BackfillChange>,
    pub applied: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignReport {
    pub tenant_id: Option<Uuid>,
    pub created_tenant: bool,
    pub unassigned: BTreeMap<String, i64>,
    pub applied: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalReport {
    pub user_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub users_removed: u64,
    pub tenants_removed: u64,
    pub applied: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantReport {
    pub user_id: Uuid,
    pub email: String,
    pub previous_role: String,
    pub applied: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    id: Uuid,
    images: Vec<String>,
    images_public_ids: Vec<String>,
}

/// Resources nobody references that are at least `ttl` old
/// Longest orphan age the cleanup accepts, ten years
pub const MAX_TTL_HOURS: u32 = 87_600;

pub fn select_orphans(
    resources: &[MediaResource],
    referenced: &HashSet<String>,
    now: DateTime<Utc>,
    ttl: Duration,
) -> Vec<String> {
    resources
        .iter()
        .filter(|r| !referenced.contains(&r.public_id))
        .filter(|r| now - r.created_at >= ttl)
        .map(|r| r.public_id.clone())
        .collect()
}

/// A product needs new ids when they are misaligned or any is empty
pub fn needs_backfill(images: &[String], public_ids: &[String]) -> bool {
    images.len() != public_ids.len() || public_ids.iter().any(|id| id.is_empty())
}

/// Last path segment of a public id, the form older uploads were stored under
pub fn bare_public_id(public_id: &str) -> &str {
    public_id.rsplit('/').next().unwrap_or(public_id)
}

pub struct MaintenanceService {
    pool: PgPool,
    media: Arc<dyn MediaStore>,
}

impl MaintenanceService {
    pub fn new(pool: PgPool, media: Arc<dyn MediaStore>) -> Self {
        Self { pool, media }
    }

    /// Delete media under `folder_root` that no product references
    pub async fn cleanup_orphans(&self, folder_root: &str, ttl_hours: u32, apply: bool) -> Result<OrphanReport, ServiceError> {
        let prefix = format!("{}/", folder_root.trim_end_matches('/'));
        let resources = self.media.list_resources(&prefix).await?;

        let referenced: HashSet<String> =
            sqlx::query_scalar::<_, String>("SELECT DISTINCT unnest(images_public_ids) FROM products")
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .filter(|id| !id.is_empty())
                .collect();

        let ttl = Duration::hours(i64::from(ttl_hours.min(MAX_TTL_HOURS)));
        let orphans = select_orphans(&resources, &referenced, Utc::now(), ttl);
        tracing::info!(
            "Scanned {} media resources under {}, {} orphaned",
            resources.len(),
            prefix,
            orphans.len()
        );

        let (mut deleted, mut failed) = (0, 0);
        if apply {
            for public_id in &orphans {
                match self.media.destroy(public_id).await {
                    Ok(_) => deleted += 1,
                    Err(e) => {
                        tracing::warn!("Failed to delete orphan {}: {}", public_id, e);
                        failed += 1;
                    }
                }
            }
        }

        Ok(OrphanReport {
            scanned: resources.len(),
            referenced: referenced.len(),
            orphans,
            deleted,
            failed,
            applied: apply,
        })
    }

    /// Public id for one image URL, checked against the media host
    async fn derive_public_id(&self, image_url: &str) -> Result<String, ServiceError> {
        let Some(candidate) = public_id_from_url(image_url) else {
            tracing::warn!("No public id derivable from {}", image_url);
            return Ok(String::new());
        };

        if self.media.resource_exists(&candidate).await? {
            return Ok(candidate);
        }

        let bare = bare_public_id(&candidate);
        if bare != candidate && self.media.resource_exists(bare).await? {
            return Ok(bare.to_string());
        }

        tracing::warn!("Media host does not know {}; keeping derived id", candidate);
        Ok(candidate)
    }

    /// Fill in missing or misaligned public ids from the image URLs
    pub async fn backfill_public_ids(&self, apply: bool) -> Result<BackfillReport, ServiceError> {
        let rows = sqlx::query_as::<_, ImageRow>("SELECT id, images, images_public_ids FROM products ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        let mut changes = Vec::new();
        for row in rows.iter().filter(|r| needs_backfill(&r.images, &r.images_public_ids)) {
            let mut after = Vec::with_capacity(row.images.len());
            for (index, url) in row.images.iter().enumerate() {
                match row.images_public_ids.get(index).filter(|id| !id.is_empty()) {
                    Some(existing) if row.images.len() == row.images_public_ids.len() => after.push(existing.clone()),
                    _ => after.push(self.derive_public_id(url).await?),
                }
            }

            changes.push(BackfillChange {
                product_id: row.id,
                before: row.images_public_ids.clone(),
                after,
            });
        }

        if apply {
            for change in &changes {
                sqlx::query("UPDATE products SET images_public_ids = $2, updated_at = now() WHERE id = $1")
                    .bind(change.product_id)
                    .bind(&change.after)
                    .execute(&self.pool)
                    .await?;
            }
            tracing::info!("Backfilled public ids on {} products", changes.len());
        }

        Ok(BackfillReport {
            scanned: rows.len(),
            changes,
            applied: apply,
        })
    }

    /// Hand rows without a tenant to the oldest tenant, creating one if needed
    pub async fn assign_tenants(&self, apply: bool) -> Result<AssignReport, ServiceError> {
        let mut unassigned = BTreeMap::new();
        for table in TENANT_TABLES {
            let sql = format!("SELECT COUNT(*) FROM {} WHERE tenant_id IS NULL", table);
            let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
            unassigned.insert(table.to_string(), count);
        }

        let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM tenants ORDER BY created_at LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        if !apply {
            return Ok(AssignReport {
                tenant_id: existing,
                created_tenant: existing.is_none(),
                unassigned,
                applied: false,
            });
        }

        let mut tx = self.pool.begin().await?;
        let (tenant_id, created_tenant) = match existing {
            Some(id) => (id, false),
            None => {
                let id = Uuid::new_v4();
                sqlx::query("INSERT INTO tenants (id, name, slug, email) VALUES ($1, $2, $3, $4)")
                    .bind(id)
                    .bind(DEFAULT_TENANT_NAME)
                    .bind(DEFAULT_TENANT_SLUG)
                    .bind(DEFAULT_TENANT_EMAIL)
                    .execute(&mut *tx)
                    .await?;
                (id, true)
            }
        };

        for table in TENANT_TABLES {
            let sql = format!("UPDATE {} SET tenant_id = $1 WHERE tenant_id IS NULL", table);
            sqlx::query(&sql).bind(tenant_id).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::info!("Assigned legacy rows to tenant {}", tenant_id);
        Ok(AssignReport {
            tenant_id: Some(tenant_id),
            created_tenant,
            unassigned,
            applied: true,
        })
    }

    /// Remove a merchant account and/or a whole store with its catalog
    pub async fn remove_merchant(
        &self,
        tenant_id: Option<Uuid>,
        user_id: Option<Uuid>,
        apply: bool,
    ) -> Result<RemovalReport, ServiceError> {
        if tenant_id.is_none() && user_id.is_none() {
            return Err(ServiceError::BadRequest("Pass --tenant-id and/or --user-id".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let mut users_removed = 0;
        let mut tenants_removed = 0;

        if let Some(user_id) = user_id {
            users_removed = sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        if let Some(tenant_id) = tenant_id {
            // children before parents so the category self-reference holds
            sqlx::query("DELETE FROM products WHERE tenant_id = $1")
                .bind(tenant_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE categories SET parent_id = NULL WHERE tenant_id = $1")
                .bind(tenant_id)
                .execute(&mut *tx)
                .await?;
            tenants_removed = sqlx::query("DELETE FROM tenants WHERE id = $1")
                .bind(tenant_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        if apply {
            tx.commit().await?;
            tracing::info!("Removed merchant user {:?} / tenant {:?}", user_id, tenant_id);
        } else {
            tx.rollback().await?;
        }

        Ok(RemovalReport {
            user_id,
            tenant_id,
            users_removed,
            tenants_removed,
            applied: apply,
        })
    }

    pub async fn grant_admin(&self, email: &str, apply: bool) -> Result<GrantReport, ServiceError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No user with email {}", email)))?;

        if apply {
            sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
                .bind(user.id)
                .bind(UserRole::Admin.as_str())
                .execute(&self.pool)
                .await?;
            tracing::info!("Granted ADMIN to {}", user.email);
        }

        Ok(GrantReport {
            user_id: user.id,
            email: user.email,
            previous_role: user.role,
            applied: apply,
        })
    }
}
