//! Identity command types
//!
//! Inputs of the account lifecycle use-cases, already shaped by the HTTP
//! layer (strings trimmed there or here; the service re-validates).

pub use crate::domain::{GetUserDto, UserStatusFilter};

/// Self-service registration
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub email: String,
    pub password: String,
    pub role: String,
    pub display_name: Option<String>,
}

/// Administrator-initiated account creation; the password is generated.
#[derive(Debug, Clone)]
pub struct AdminCreateUserCommand {
    pub email: String,
    pub role: String,
    pub display_name: Option<String>,
}

/// Result of a verification attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    AlreadyVerified,
}

/// Result of a resend request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendOutcome {
    Sent,
    AlreadyVerified,
}
