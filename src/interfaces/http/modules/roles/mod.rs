//! Roles module: public role catalog

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::identity::AccountService;
use crate::domain::Role;
use crate::interfaces::http::common::ApiResponse;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleDto {
    pub role_id: i32,
    pub role_name: String,
}

impl From<&Role> for RoleDto {
    fn from(r: &Role) -> Self {
        Self {
            role_id: r.id,
            role_name: r.name.clone(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/roles",
    tag = "Roles",
    responses(
        (status = 200, description = "Seeded roles", body = ApiResponse<Vec<RoleDto>>)
    )
)]
pub async fn list_roles(State(accounts): State<Arc<AccountService>>) -> Json<ApiResponse<Vec<RoleDto>>> {
    let roles = accounts.roles().roles().iter().map(RoleDto::from).collect();
    Json(ApiResponse::success(roles))
}
