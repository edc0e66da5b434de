pub mod brand_service;
pub mod category_service;
pub mod maintenance_service;
pub mod product_service;
pub mod spec_group_service;
pub mod storefront_service;
pub mod tenant_service;
pub mod traffic_service;
pub mod upload_service;

use thiserror::Error;

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::media::MediaError;

pub use brand_service::BrandService;
pub use category_service::CategoryService;
pub use maintenance_service::MaintenanceService;
pub use product_service::ProductService;
pub use spec_group_service::SpecGroupService;
pub use storefront_service::StorefrontService;
pub use tenant_service::TenantService;
pub use traffic_service::TrafficService;
pub use upload_service::UploadService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{field}: {problem}")]
    Invalid { field: String, problem: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ServiceError {
    pub fn invalid(field: &str, problem: impl Into<String>) -> Self {
        ServiceError::Invalid {
            field: field.to_string(),
            problem: problem.into(),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(err.into())
    }
}

/// Trimmed `value`, rejected when absent or shorter than `min` characters
pub(crate) fn required_text(field: &str, value: Option<&str>, min: usize) -> Result<String, ServiceError> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(ServiceError::invalid(field, "is required"));
    }
    check_min_len(field, value, min)?;
    Ok(value.to_string())
}

pub(crate) fn check_min_len(field: &str, value: &str, min: usize) -> Result<(), ServiceError> {
    if value.trim().chars().count() < min {
        return Err(ServiceError::invalid(field, format!("must be at least {} characters", min)));
    }
    Ok(())
}

/// Rows scoped to a tenant are visible to that tenant only
pub(crate) fn ensure_owner(row_tenant: Option<uuid::Uuid>, tenant_id: uuid::Uuid, what: &str) -> Result<(), ServiceError> {
    if row_tenant == Some(tenant_id) {
        Ok(())
    } else {
        tracing::warn!("Tenant {} denied access to {} owned by {:?}", tenant_id, what, row_tenant);
        Err(ServiceError::Forbidden(format!("{} belongs to another store", what)))
    }
}
