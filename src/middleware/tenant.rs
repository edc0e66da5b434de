use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::database::models::Tenant;
use crate::error::ApiError;
use crate::services::TenantService;
use crate::AppState;

/// The store the authenticated merchant acts for, injected by middleware
#[derive(Clone, Debug)]
pub struct CurrentTenant(pub Tenant);

/// Middleware that requires a tenant in the session and checks it still exists.
/// Must run after `jwt_auth_middleware`.
pub async fn require_tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let tenant_id = auth_user.tenant_id.ok_or_else(|| {
        tracing::warn!("User {} has no store attached", auth_user.email);
        ApiError::forbidden("No store is linked to this account")
    })?;

    let tenant = TenantService::new(state.pool.clone())
        .find_tenant(tenant_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Tenant {} in session of {} no longer exists", tenant_id, auth_user.email);
            ApiError::forbidden("Store no longer exists")
        })?;

    tracing::debug!("Tenant validation successful: {} ({})", tenant.slug, tenant.id);

    request.extensions_mut().insert(CurrentTenant(tenant));
    Ok(next.run(request).await)
}
