//! Authentication DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::interfaces::http::common::trimmed;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
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

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResendVerificationRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    /// Keep the session cookie after the browser closes
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verified: bool,
    pub already_verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_email_is_trimmed_before_validation() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"email":"  A@x.com ","password":"Secret1!","roleName":"Yard Manager"}"#,
        )
        .unwrap();

        assert_eq!(req.email, "A@x.com");
        assert_eq!(req.role, "Yard Manager");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn remember_me_defaults_to_false() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"Secret1!"}"#).unwrap();
        assert!(!req.remember_me);
    }
}
