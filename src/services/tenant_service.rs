use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::ServiceError;
use crate::auth::{hash_password, verify_password, AuthError};
use crate::catalog::slugify;
use crate::database::models::{Tenant, User, UserRole};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub store_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Registration input after validation
#[derive(Debug, Clone, PartialEq)]
pub struct NewMerchant {
    pub store_name: String,
    pub slug: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub message: String,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check a registration request without touching the database
pub fn validate_registration(request: &RegisterRequest, min_password_length: usize) -> Result<NewMerchant, ServiceError> {
    let store_name = request.store_name.as_deref().map(str::trim).unwrap_or_default();
    let email = request.email.as_deref().map(normalize_email).unwrap_or_default();
    let password = request.password.clone().unwrap_or_default();

    if store_name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ServiceError::BadRequest("Store name, email and password are required".to_string()));
    }

    if password.chars().count() < min_password_length {
        return Err(ServiceError::invalid(
            "password",
            format!("must be at least {} characters", min_password_length),
        ));
    }

    if !is_plausible_email(&email) {
        return Err(ServiceError::invalid("email", "is not a valid email address"));
    }

    let slug = slugify(store_name);
    if slug.is_empty() {
        return Err(ServiceError::invalid("storeName", "must contain letters or digits"));
    }

    Ok(NewMerchant {
        store_name: store_name.to_string(),
        slug,
        email,
        password,
    })
}

/// Tenant accounts and the merchants that sign in to them
pub struct TenantService {
    pool: PgPool,
}

impl TenantService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a tenant and its first merchant in one transaction
    pub async fn register(&self, merchant: NewMerchant) -> Result<Registration, ServiceError> {
        let hashed_password = hash_password(&merchant.password)?;
        let tenant_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO tenants (id, name, slug, email) VALUES ($1, $2, $3, $4)")
            .bind(tenant_id)
            .bind(&merchant.store_name)
            .bind(&merchant.slug)
            .bind(&merchant.email)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO users (id, email, name, hashed_password, role, tenant_id) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user_id)
        .bind(&merchant.email)
        .bind(&merchant.store_name)
        .bind(&hashed_password)
        .bind(UserRole::Merchant.as_str())
        .bind(tenant_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Registered store '{}' ({}) for {}", merchant.slug, tenant_id, merchant.email);

        Ok(Registration {
            message: "Store registered".to_string(),
            tenant_id,
            user_id,
        })
    }

    /// Verify credentials; unknown email and wrong password look the same
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let user = self.find_user_by_email(email).await?;

        match user {
            Some(user) if verify_password(password, &user.hashed_password) => Ok(user),
            _ => {
                tracing::warn!("Failed login attempt for {}", normalize_email(email));
                Err(AuthError::InvalidCredentials.into())
            }
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>, ServiceError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    /// Storefront lookup by the public store slug
    pub async fn find_by_slug(&self, slug: &str) -> Result<Tenant, ServiceError> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store '{}' not found", slug)))
    }
}
