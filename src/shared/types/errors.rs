use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Role '{0}' not found")]
    RoleNotFound(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Account exists and is verified but has been disabled.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Account has not confirmed its email yet. Carries the address so the
    /// client can route the user to the verification screen.
    #[error("Please verify your email before logging in")]
    NeedsVerification { email: String },

    #[error("Verification code expired. Please request a new one")]
    Expired,

    #[error("Invalid verification code")]
    Mismatch,

    /// The state change was persisted but the email could not be delivered.
    #[error("{0}")]
    NotificationFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn user_not_found(field: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "User",
            field,
            value: value.into(),
        }
    }

    /// Stable machine-readable code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation_error",
            Self::RoleNotFound(_) => "role_not_found",
            Self::Conflict(_) => "conflict",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "account_disabled",
            Self::NeedsVerification { .. } => "needs_verification",
            Self::Expired => "code_expired",
            Self::Mismatch => "code_mismatch",
            Self::NotificationFailed(_) => "notification_failed",
            Self::Storage(_) => "internal_error",
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl From<InfraError> for DomainError {
    fn from(e: InfraError) -> Self {
        DomainError::Storage(e.to_string())
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_for_login_rejections() {
        let disabled = DomainError::Forbidden("Account is disabled".into());
        let unverified = DomainError::NeedsVerification {
            email: "a@x.com".into(),
        };
        assert_ne!(disabled.code(), unverified.code());
    }

    #[test]
    fn infra_errors_become_storage_errors() {
        let err: DomainError = InfraError::Crypto("bad salt".into()).into();
        assert!(matches!(err, DomainError::Storage(ref m) if m.contains("bad salt")));
    }
}
