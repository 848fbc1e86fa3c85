//! User management API handlers
//!
//! Administrator-only endpoints. Delegates to `AccountService`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    CreateUserRequest, ListUsersParams, ReassignRoleRequest, UserStatsDto, UserSummary,
};
use crate::application::identity::{AccountService, AdminCreateUserCommand};
use crate::domain::{DomainError, GetUserDto, UserStatusFilter};
use crate::interfaces::http::common::{ApiResponse, PaginatedResponse, ValidatedJson};
use crate::interfaces::http::error::ApiError;
use crate::interfaces::http::middleware::CurrentUser;
use crate::shared::compose_display_name;

/// User handler state
#[derive(Clone)]
pub struct UserHandlerState {
    pub accounts: Arc<AccountService>,
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(ListUsersParams),
    responses(
        (status = 200, description = "User list", body = ApiResponse<PaginatedResponse<UserSummary>>),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<UserSummary>>>, ApiError> {
    let status = match params.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(UserStatusFilter::parse(raw).ok_or_else(|| {
            DomainError::Validation(format!("Unknown status filter '{}'", raw))
        })?),
    };

    let dto = GetUserDto {
        search: params.search,
        role: params.role.filter(|r| !r.trim().is_empty()),
        status,
        page: params.page,
        page_size: params.page_size,
    };

    let result = state.accounts.list_users(dto).await?;
    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    get,
    path = "/users/stats",
    tag = "Users",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Directory totals", body = ApiResponse<UserStatsDto>),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn user_stats(
    State(state): State<UserHandlerState>,
) -> Result<Json<ApiResponse<UserStatsDto>>, ApiError> {
    let stats = state.accounts.user_stats().await?;
    Ok(Json(ApiResponse::success(stats.into())))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created, verification pending", body = ApiResponse<UserSummary>),
        (status = 400, description = "Validation error or unknown role"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "User saved but the welcome email failed")
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserSummary>>), ApiError> {
    let display_name = compose_display_name(
        request.username.as_deref(),
        request.first_name.as_deref(),
        request.last_name.as_deref(),
    );

    let user = state
        .accounts
        .create_user_as_admin(AdminCreateUserCommand {
            email: request.email,
            role: request.role,
            display_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(UserSummary::from(user))
                .with_message("User created. A welcome email with sign-in details was sent."),
        ),
    ))
}

#[utoipa::path(
    patch,
    path = "/users/{id}/toggle-active",
    tag = "Users",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Activation flipped", body = ApiResponse<UserSummary>),
        (status = 400, description = "Cannot change own account"),
        (status = 404, description = "Not found")
    )
)]
pub async fn toggle_active(
    State(state): State<UserHandlerState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    let user = state.accounts.toggle_active(&actor.0.id, &id).await?;
    let message = if user.is_active {
        "User activated."
    } else {
        "User deactivated."
    };
    Ok(Json(
        ApiResponse::success(UserSummary::from(user)).with_message(message),
    ))
}

#[utoipa::path(
    put,
    path = "/users/{id}/role",
    tag = "Users",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    request_body = ReassignRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<UserSummary>),
        (status = 404, description = "User or role not found")
    )
)]
pub async fn reassign_role(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<ReassignRoleRequest>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    let user = state.accounts.reassign_role(&id, &request.role).await?;
    Ok(Json(
        ApiResponse::success(UserSummary::from(user)).with_message("Role updated."),
    ))
}
