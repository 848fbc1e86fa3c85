//! Outbound ports: collaborators the identity service depends on
//!
//! Mail delivery, password hashing and the clock are abstracted here so the
//! account lifecycle can run against SMTP/bcrypt in production and against
//! in-memory doubles in tests. Adapters live in `infrastructure`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::shared::DomainResult;

// ── Notification dispatch ──────────────────────────────────────

/// A plain-text email ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to_address: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("{0}")]
    NotConfigured(String),

    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Delivers notifications to users. No retries: a failure is reported
/// to the caller as-is.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), NotificationError>;
}

// ── Credentials ────────────────────────────────────────────────

/// Opaque password hashing oracle
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> DomainResult<String>;

    /// `false` for a mismatch as well as for an unreadable stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

// ── Time ───────────────────────────────────────────────────────

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock (UTC)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
