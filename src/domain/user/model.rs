//! User aggregate and its verification state transitions

use chrono::{DateTime, Utc};

/// Outstanding email verification code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification {
    /// Exactly six ASCII digits
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl PendingVerification {
    /// A code is expired from its expiry instant onwards.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Derived lifecycle state of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    /// Email not confirmed yet; login is blocked
    PendingVerification,
    /// Confirmed and active; login allowed
    Active,
    /// Confirmed but switched off by an administrator
    Disabled,
}

impl AccountState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingVerification => "pending_verification",
            Self::Active => "active",
            Self::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for AccountState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User model
#[derive(Clone, Debug)]
pub struct User {
    pub id: String,
    /// Normalized (trimmed, lowercase) address; unique
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: String,
    /// Canonical name of the single assigned role
    pub role_name: String,
    pub is_active: bool,
    pub email_confirmed: bool,
    pub pending_verification: Option<PendingVerification>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// New account awaiting email verification.
    pub fn new_pending(
        email: String,
        display_name: Option<String>,
        password_hash: String,
        role_name: String,
        verification: PendingVerification,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            display_name,
            password_hash,
            role_name,
            is_active: false,
            email_confirmed: false,
            pending_verification: Some(verification),
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    pub fn state(&self) -> AccountState {
        match (self.email_confirmed, self.is_active) {
            (false, _) => AccountState::PendingVerification,
            (true, true) => AccountState::Active,
            (true, false) => AccountState::Disabled,
        }
    }

    pub fn can_sign_in(&self) -> bool {
        self.state() == AccountState::Active
    }

    /// Replace any outstanding code; only one code is valid at a time.
    pub fn issue_verification(&mut self, verification: PendingVerification, now: DateTime<Utc>) {
        self.pending_verification = Some(verification);
        self.updated_at = now;
    }

    /// Successful code match: activate and clear the pending code.
    pub fn confirm_email(&mut self, now: DateTime<Utc>) {
        self.email_confirmed = true;
        self.is_active = true;
        self.pending_verification = None;
        self.updated_at = now;
    }

    pub fn assign_role(&mut self, role_name: impl Into<String>, now: DateTime<Utc>) {
        self.role_name = role_name.into();
        self.updated_at = now;
    }

    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.is_active = active;
        self.updated_at = now;
    }

    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login_at = Some(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending_user(now: DateTime<Utc>) -> User {
        User::new_pending(
            "a@x.com".into(),
            Some("Alice".into()),
            "hash".into(),
            "Yard Manager".into(),
            PendingVerification {
                code: "123456".into(),
                expires_at: now + Duration::minutes(15),
            },
            now,
        )
    }

    #[test]
    fn new_user_is_pending() {
        let now = Utc::now();
        let user = pending_user(now);
        assert_eq!(user.state(), AccountState::PendingVerification);
        assert!(!user.is_active);
        assert!(!user.email_confirmed);
        assert!(!user.can_sign_in());
        assert!(user.pending_verification.is_some());
    }

    #[test]
    fn confirm_email_activates_and_clears_code() {
        let now = Utc::now();
        let mut user = pending_user(now);
        user.confirm_email(now);
        assert_eq!(user.state(), AccountState::Active);
        assert!(user.pending_verification.is_none());
        assert!(user.can_sign_in());
    }

    #[test]
    fn disabling_a_verified_user() {
        let now = Utc::now();
        let mut user = pending_user(now);
        user.confirm_email(now);
        user.set_active(false, now);
        assert_eq!(user.state(), AccountState::Disabled);
        assert!(!user.can_sign_in());
    }

    #[test]
    fn expiry_is_inclusive() {
        let now = Utc::now();
        let pending = PendingVerification {
            code: "000001".into(),
            expires_at: now,
        };
        assert!(pending.is_expired_at(now));
        assert!(!pending.is_expired_at(now - Duration::seconds(1)));
    }
}
