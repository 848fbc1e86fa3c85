//! User DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{User, UserStats};
use crate::interfaces::http::common::trimmed;

/// User API representation. Never carries the hash or the pending code.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    /// Same value as `id`
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Display name, falling back to the email address
    pub username: String,
    pub role_name: String,
    pub is_active: bool,
    pub email_confirmed: bool,
    pub needs_verification: bool,
    /// pending_verification | active | disabled
    pub state: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserSummary {
    fn from(u: User) -> Self {
        Self {
            state: u.state().to_string(),
            needs_verification: !u.email_confirmed,
            user_id: u.id.clone(),
            username: u.display_name.clone().unwrap_or_else(|| u.email.clone()),
            id: u.id,
            email: u.email,
            display_name: u.display_name,
            role_name: u.role_name,
            is_active: u.is_active,
            email_confirmed: u.email_confirmed,
            created_at: u.created_at,
            last_login_at: u.last_login_at,
        }
    }
}

/// Administrator-initiated account creation
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[serde(alias = "roleName")]
    #[validate(length(min = 1, message = "role is required"))]
    pub role: String,
    #[validate(length(max = 100, message = "username must be at most 100 characters"))]
    pub username: Option<String>,
    #[validate(length(max = 100, message = "firstName must be at most 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 100, message = "lastName must be at most 100 characters"))]
    pub last_name: Option<String>,
}

/// Role change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReassignRoleRequest {
    #[serde(alias = "roleName")]
    #[validate(length(min = 1, message = "role is required"))]
    pub role: String,
}

/// List users query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListUsersParams {
    /// Search by email or display name
    pub search: Option<String>,
    /// Filter by role name
    pub role: Option<String>,
    /// active | inactive | pending
    pub status: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsDto {
    pub total: u64,
    pub active: u64,
    pub administrators: u64,
    pub pending_verification: u64,
}

impl From<UserStats> for UserStatsDto {
    fn from(s: UserStats) -> Self {
        Self {
            total: s.total,
            active: s.active,
            administrators: s.administrators,
            pending_verification: s.pending_verification,
        }
    }
}
