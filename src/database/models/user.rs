use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub role: String,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Roles stored in `users.role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Merchant,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Merchant => "MERCHANT",
            UserRole::Admin => "ADMIN",
        }
    }

    /// Unknown role strings fall back to the least privileged role
    pub fn parse(role: &str) -> Self {
        match role {
            "ADMIN" => UserRole::Admin,
            _ => UserRole::Merchant,
        }
    }
}

impl User {
    pub fn role(&self) -> UserRole {
        UserRole::parse(&self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_round_trip_through_strings() {
        assert_eq!(UserRole::parse(UserRole::Admin.as_str()), UserRole::Admin);
        assert_eq!(UserRole::parse("MERCHANT"), UserRole::Merchant);
        assert_eq!(UserRole::parse("superuser"), UserRole::Merchant);
    }
}
