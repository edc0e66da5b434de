//! Test doubles shared by the unit and router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::media::{MediaError, MediaResource, MediaStore, UploadTicket};
use crate::services::tenant_service::NewMerchant;
use crate::services::TenantService;

/// In-memory media host that records what it was asked to delete
#[derive(Default)]
pub struct FakeMediaStore {
    pub configured: bool,
    pub resources: Vec<MediaResource>,
    pub destroyed: Mutex<Vec<String>>,
}

impl FakeMediaStore {
    pub fn configured() -> Self {
        Self {
            configured: true,
            ..Self::default()
        }
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MediaStore for FakeMediaStore {
    fn sign_upload(&self, folder: &str, timestamp: i64) -> Result<UploadTicket, MediaError> {
        if !self.configured {
            return Err(MediaError::NotConfigured);
        }
        Ok(UploadTicket {
            signature: format!("signed:{}:{}", folder, timestamp),
            timestamp,
            api_key: "key".to_string(),
            cloud_name: "demo".to_string(),
            upload_url: "https://media.test/demo/image/upload".to_string(),
            folder: folder.to_string(),
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<bool, MediaError> {
        if !self.configured {
            return Err(MediaError::NotConfigured);
        }
        if let Ok(mut destroyed) = self.destroyed.lock() {
            destroyed.push(public_id.to_string());
        }
        Ok(self.resources.iter().any(|r| r.public_id == public_id))
    }

    async fn list_resources(&self, prefix: &str) -> Result<Vec<MediaResource>, MediaError> {
        Ok(self
            .resources
            .iter()
            .filter(|r| r.public_id.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn resource_exists(&self, public_id: &str) -> Result<bool, MediaError> {
        Ok(self.resources.iter().any(|r| r.public_id == public_id))
    }
}

/// Pool that never connects unless a query runs
pub fn lazy_pool() -> PgPool {
    let mut config = AppConfig::development().database;
    config.connection_timeout = 1;
    match DatabaseManager::connect_lazy(&config) {
        Ok(pool) => pool,
        Err(e) => panic!("lazy pool: {}", e),
    }
}

/// Migrated pool for tests that need Postgres; None when DATABASE_URL is unset
pub async fn database_pool() -> Option<PgPool> {
    let _ = dotenvy::dotenv();
    let url = std::env::var("DATABASE_URL").ok()?;

    let mut config = AppConfig::development().database;
    config.url = url;
    let pool = match DatabaseManager::connect(&config).await {
        Ok(pool) => pool,
        Err(e) => panic!("test database: {}", e),
    };
    if let Err(e) = DatabaseManager::migrate(&pool).await {
        panic!("test migrations: {}", e);
    }
    Some(pool)
}

/// Register a throwaway store and return its tenant id
pub async fn new_tenant(pool: &PgPool) -> Uuid {
    let suffix = Uuid::new_v4().simple().to_string();
    let merchant = NewMerchant {
        store_name: format!("Test Store {}", suffix),
        slug: format!("test-store-{}", suffix),
        email: format!("owner-{}@shop.test", suffix),
        password: "correct-horse-battery".to_string(),
    };
    match TenantService::new(pool.clone()).register(merchant).await {
        Ok(registration) => registration.tenant_id,
        Err(e) => panic!("register test tenant: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::product_service::destroy_best_effort;

    #[tokio::test]
    async fn best_effort_delete_swallows_host_errors() {
        let unconfigured = FakeMediaStore::default();
        assert!(!destroy_best_effort(&unconfigured, "tenants/t/", "tenants/t/a").await);

        let store = FakeMediaStore::configured();
        assert!(!destroy_best_effort(&store, "tenants/t/", "tenants/t/missing").await);
        assert_eq!(store.destroyed(), vec!["tenants/t/missing".to_string()]);
    }

    #[tokio::test]
    async fn best_effort_delete_stays_inside_the_prefix() {
        let store = FakeMediaStore::configured();
        assert!(!destroy_best_effort(&store, "tenants/mine/", "tenants/theirs/products/p/img").await);
        assert!(store.destroyed().is_empty());
    }

    #[test]
    fn unconfigured_store_refuses_to_sign() {
        let store = FakeMediaStore::default();
        assert!(matches!(store.sign_upload("tenants/t/assets", 1), Err(MediaError::NotConfigured)));
        assert_eq!(FakeMediaStore::configured().sign_upload("f", 7).unwrap().folder, "f");
    }
}
