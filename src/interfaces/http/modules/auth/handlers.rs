//! Authentication API handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::info;

use super::dto::{
    LoginRequest, RegisterRequest, ResendVerificationRequest, VerificationResult,
    VerifyEmailRequest,
};
use crate::application::identity::{
    AccountService, RegisterCommand, ResendOutcome, VerificationOutcome,
};
use crate::infrastructure::crypto::SessionIssuer;
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};
use crate::interfaces::http::error::ApiError;
use crate::interfaces::http::middleware::{session_token, with_cookie, CookieSettings, CurrentUser};
use crate::interfaces::http::modules::users::UserSummary;
use crate::shared::compose_display_name;

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub accounts: Arc<AccountService>,
    pub sessions: Arc<SessionIssuer>,
    pub cookie: CookieSettings,
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered, verification pending", body = ApiResponse<UserSummary>),
        (status = 400, description = "Validation error or unknown role"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Account saved but the verification email failed")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    let display_name = compose_display_name(
        request.username.as_deref(),
        request.first_name.as_deref(),
        request.last_name.as_deref(),
    );

    let user = state
        .accounts
        .register(RegisterCommand {
            email: request.email,
            password: request.password,
            role: request.role,
            display_name,
        })
        .await?;

    Ok(Json(
        ApiResponse::success(UserSummary::from(user))
            .with_message("Registration successful. Please check your email for the verification code."),
    ))
}

#[utoipa::path(
    post,
    path = "/verify-email",
    tag = "Authentication",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Verified, or already verified", body = ApiResponse<VerificationResult>),
        (status = 400, description = "Bad format, expired, mismatch or no pending code"),
        (status = 404, description = "Unknown email")
    )
)]
pub async fn verify_email(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<VerifyEmailRequest>,
) -> Result<Json<ApiResponse<VerificationResult>>, ApiError> {
    let outcome = state
        .accounts
        .verify_email(&request.email, &request.code)
        .await?;

    let (result, message) = match outcome {
        VerificationOutcome::Verified => (
            VerificationResult {
                verified: true,
                already_verified: false,
            },
            "Email verified successfully. You can now sign in.",
        ),
        VerificationOutcome::AlreadyVerified => (
            VerificationResult {
                verified: true,
                already_verified: true,
            },
            "Email already verified.",
        ),
    };

    Ok(Json(ApiResponse::success(result).with_message(message)))
}

#[utoipa::path(
    post,
    path = "/resend-verification",
    tag = "Authentication",
    request_body = ResendVerificationRequest,
    responses(
        (status = 200, description = "New code sent, or already verified", body = ApiResponse<String>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Unknown email"),
        (status = 500, description = "Code replaced but the email failed")
    )
)]
pub async fn resend_verification(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<ResendVerificationRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let message = match state.accounts.resend_verification(&request.email).await? {
        ResendOutcome::Sent => "A new verification code has been sent.",
        ResendOutcome::AlreadyVerified => "Email already verified.",
    };
    Ok(Json(ApiResponse::message(message)))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = ApiResponse<UserSummary>),
        (status = 401, description = "Wrong password"),
        (status = 403, description = "Email not verified (needsVerification) or account disabled"),
        (status = 404, description = "Unknown email")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let user = state.accounts.login(&request.email, &request.password).await?;
    let session = state.sessions.issue(&user)?;

    let max_age = request.remember_me.then_some(session.max_age_secs);
    let cookie = state.cookie.session_cookie(&session.token, max_age);

    let response = Json(
        ApiResponse::success(UserSummary::from(user)).with_message("Signed in."),
    )
    .into_response();
    Ok(with_cookie(response, &cookie))
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Session revoked and cookie cleared", body = ApiResponse<String>)
    )
)]
pub async fn logout(State(state): State<AuthHandlerState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers, &state.cookie) {
        state.sessions.revoke(token);
        info!("User logged out");
    }

    let response = Json(ApiResponse::message("Signed out.")).into_response();
    with_cookie(response, &state.cookie.cleared_cookie())
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Authentication",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserSummary>),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_current_user(
    Extension(user): Extension<CurrentUser>,
) -> Json<ApiResponse<UserSummary>> {
    Json(ApiResponse::success(UserSummary::from(user.0)))
}
