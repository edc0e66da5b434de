use axum::extract::Extension;
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Tenant, UserRole};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, CurrentTenant};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub tenant: Tenant,
}

/// GET /api/merchant/whoami - Current merchant and store
pub async fn get(
    Extension(auth_user): Extension<AuthUser>,
    Extension(CurrentTenant(tenant)): Extension<CurrentTenant>,
) -> ApiResult<WhoAmI> {
    Ok(ApiResponse::success(WhoAmI {
        user_id: auth_user.user_id,
        email: auth_user.email,
        role: auth_user.role,
        tenant,
    }))
}
