//! Mapping of domain errors onto HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::common::ErrorResponse;
use crate::domain::DomainError;
use crate::shared::InfraError;

/// Error returned by every handler
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl From<InfraError> for ApiError {
    fn from(e: InfraError) -> Self {
        Self(e.into())
    }
}

pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Validation(_)
        | DomainError::RoleNotFound(_)
        | DomainError::Expired
        | DomainError::Mismatch => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Forbidden(_) | DomainError::NeedsVerification { .. } => StatusCode::FORBIDDEN,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::NotificationFailed(_) | DomainError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Client-facing text. Storage details stay in the log.
fn public_message(error: &DomainError) -> String {
    match error {
        DomainError::Validation(msg)
        | DomainError::Conflict(msg)
        | DomainError::Forbidden(msg)
        | DomainError::NotificationFailed(msg) => msg.clone(),
        DomainError::Unauthorized(_) => "Your password is wrong".to_string(),
        DomainError::NotFound { entity: "User", field: "email", .. } => {
            "Email not found".to_string()
        }
        DomainError::NotFound { entity, .. } => format!("{} not found", entity),
        DomainError::Storage(_) => "Internal server error".to_string(),
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!(error = %self.0, code = self.0.code(), "Request failed");
        }

        let mut body = ErrorResponse::new(self.0.code(), public_message(&self.0));
        if let DomainError::NeedsVerification { email } = self.0 {
            body.needs_verification = Some(true);
            body.email = Some(email);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(error: DomainError) -> (StatusCode, serde_json::Value) {
        let resp = ApiError(error).into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn needs_verification_carries_flag_and_email() {
        let (status, json) = body_of(DomainError::NeedsVerification {
            email: "a@x.com".into(),
        })
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["code"], "needs_verification");
        assert_eq!(json["needsVerification"], true);
        assert_eq!(json["email"], "a@x.com");
    }

    #[tokio::test]
    async fn disabled_account_has_no_verification_flag() {
        let (status, json) = body_of(DomainError::Forbidden("Account is disabled".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["code"], "account_disabled");
        assert!(json.get("needsVerification").is_none());
    }

    #[tokio::test]
    async fn storage_errors_are_not_leaked() {
        let (status, json) = body_of(DomainError::Storage("disk I/O error at /var/db".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["message"], "Internal server error");
    }

    #[tokio::test]
    async fn message_mirrors_error_text() {
        let (_, json) = body_of(DomainError::Mismatch).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], json["error"]);
        assert_eq!(json["message"], "Invalid verification code");
    }

    #[test]
    fn verification_failures_are_bad_requests() {
        assert_eq!(status_for(&DomainError::Expired), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&DomainError::Mismatch), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&DomainError::RoleNotFound("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&DomainError::NotificationFailed("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
