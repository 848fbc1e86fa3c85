//! Account lifecycle service: application-layer orchestration
//!
//! Registration, email verification, resend, login gating and the
//! administrator operations all live here. HTTP handlers are thin wrappers.
//!
//! Persist first, notify second: when mail delivery fails after a state
//! change the change is kept and `DomainError::NotificationFailed` is
//! returned, so the user can recover through resend.

use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};

use super::codes::{
    codes_match, generate_temporary_password, generate_verification_code, is_well_formed_code,
    normalize_code,
};
use super::commands::{
    AdminCreateUserCommand, RegisterCommand, ResendOutcome, VerificationOutcome,
};
use super::messages::{verification_email, welcome_email};
use crate::application::ports::{
    Clock, NotificationDispatcher, OutboundEmail, PasswordHasher, SystemClock,
};
use crate::domain::{
    DomainError, DomainResult, GetUserDto, PendingVerification, Role, RoleCatalog, User,
    UserRepositoryInterface, UserStats, ADMINISTRATOR_ROLE,
};
use crate::shared::{check_password_policy, normalize_email, validate_pagination, PaginatedResult};

/// Default lifetime of a verification code
pub const DEFAULT_CODE_TTL_MINUTES: i64 = 15;

pub struct AccountService {
    users: Arc<dyn UserRepositoryInterface>,
    roles: Arc<RoleCatalog>,
    hasher: Arc<dyn PasswordHasher>,
    notifier: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    code_ttl: Duration,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepositoryInterface>,
        roles: Arc<RoleCatalog>,
        hasher: Arc<dyn PasswordHasher>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            users,
            roles,
            hasher,
            notifier,
            clock: Arc::new(SystemClock),
            code_ttl: Duration::minutes(DEFAULT_CODE_TTL_MINUTES),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_code_ttl_minutes(mut self, minutes: i64) -> Self {
        self.code_ttl = Duration::minutes(minutes.max(1));
        self
    }

    pub fn roles(&self) -> &RoleCatalog {
        &self.roles
    }

    pub fn code_ttl_minutes(&self) -> i64 {
        self.code_ttl.num_minutes()
    }

    // ── Registration ────────────────────────────────────────────

    /// Self-service registration. The new account is pending verification
    /// and a code is mailed to it.
    pub async fn register(&self, cmd: RegisterCommand) -> DomainResult<User> {
        let email = normalize_email(&cmd.email);
        let role_name = cmd.role.trim();

        if email.is_empty() || cmd.password.trim().is_empty() || role_name.is_empty() {
            return Err(DomainError::Validation(
                "Email, password, and role are required.".into(),
            ));
        }
        check_password_policy(&cmd.password).map_err(DomainError::Validation)?;

        let role = self.resolve_role_for_create(&email, role_name).await?;
        let password_hash = self.hasher.hash(&cmd.password)?;

        let (user, code) = self
            .create_pending(email, cmd.display_name, password_hash, role)
            .await?;

        metrics::counter!("yms_registrations_total", "source" => "self").increment(1);
        info!(user_id = %user.id, role = %user.role_name, "New user registered");

        let message = verification_email(
            &user.email,
            user.display_name.as_deref(),
            &code,
            self.code_ttl_minutes(),
        );
        self.dispatch(message, "Registration saved but email failed")
            .await?;

        Ok(user)
    }

    /// Administrator creates an account on behalf of someone. A temporary
    /// password is generated and mailed together with the verification code.
    pub async fn create_user_as_admin(&self, cmd: AdminCreateUserCommand) -> DomainResult<User> {
        let email = normalize_email(&cmd.email);
        let role_name = cmd.role.trim();

        if email.is_empty() || role_name.is_empty() {
            return Err(DomainError::Validation("Email and role are required.".into()));
        }

        let role = self.resolve_role_for_create(&email, role_name).await?;
        let temporary_password = generate_temporary_password();
        let password_hash = self.hasher.hash(&temporary_password)?;

        let (user, code) = self
            .create_pending(email, cmd.display_name, password_hash, role)
            .await?;

        metrics::counter!("yms_registrations_total", "source" => "admin").increment(1);
        info!(user_id = %user.id, role = %user.role_name, "User created by administrator");

        let message = welcome_email(
            &user.email,
            user.display_name.as_deref(),
            &user.role_name,
            &temporary_password,
            &code,
            self.code_ttl_minutes(),
        );
        self.dispatch(message, "User saved but email failed").await?;

        Ok(user)
    }

    // ── Verification ────────────────────────────────────────────

    pub async fn verify_email(&self, email: &str, code: &str) -> DomainResult<VerificationOutcome> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(DomainError::Validation("Email and code are required.".into()));
        }

        let mut user = self
            .users
            .get_user_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::user_not_found("email", &email))?;

        if user.email_confirmed {
            return Ok(VerificationOutcome::AlreadyVerified);
        }

        let Some(pending) = user.pending_verification.as_ref() else {
            return Err(DomainError::Validation(
                "No verification code found. Please request a new one.".into(),
            ));
        };

        let code = normalize_code(code);
        if !is_well_formed_code(&code) {
            return Err(DomainError::Validation(
                "Verification code must be 6 digits.".into(),
            ));
        }

        let now = self.clock.now();
        if pending.is_expired_at(now) {
            metrics::counter!("yms_verifications_total", "outcome" => "expired").increment(1);
            return Err(DomainError::Expired);
        }

        if !codes_match(&pending.code, &code) {
            metrics::counter!("yms_verifications_total", "outcome" => "mismatch").increment(1);
            return Err(DomainError::Mismatch);
        }

        user.confirm_email(now);
        self.users.update_user(&user).await?;

        metrics::counter!("yms_verifications_total", "outcome" => "verified").increment(1);
        info!(user_id = %user.id, "Email verified");
        Ok(VerificationOutcome::Verified)
    }

    /// Issue a fresh code, invalidating the previous one.
    pub async fn resend_verification(&self, email: &str) -> DomainResult<ResendOutcome> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(DomainError::Validation("Email is required.".into()));
        }

        let mut user = self
            .users
            .get_user_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::user_not_found("email", &email))?;

        if user.email_confirmed {
            return Ok(ResendOutcome::AlreadyVerified);
        }

        let now = self.clock.now();
        let code = generate_verification_code();
        user.issue_verification(
            PendingVerification {
                code: code.clone(),
                expires_at: now + self.code_ttl,
            },
            now,
        );
        self.users.update_user(&user).await?;

        info!(user_id = %user.id, "Verification code reissued");

        let message = verification_email(
            &user.email,
            user.display_name.as_deref(),
            &code,
            self.code_ttl_minutes(),
        );
        self.dispatch(message, "Email failed").await?;

        Ok(ResendOutcome::Sent)
    }

    // ── Authentication ──────────────────────────────────────────

    /// Check whether the account may sign in, then the password.
    ///
    /// Unverified accounts are rejected before the password is looked at,
    /// then disabled accounts. The caller establishes the session.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<User> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "Email and password are required.".into(),
            ));
        }

        let Some(mut user) = self.users.get_user_by_email(&email).await? else {
            metrics::counter!("yms_logins_total", "outcome" => "unknown_email").increment(1);
            return Err(DomainError::user_not_found("email", &email));
        };

        if !user.email_confirmed {
            metrics::counter!("yms_logins_total", "outcome" => "unverified").increment(1);
            return Err(DomainError::NeedsVerification { email: user.email });
        }

        if !user.is_active {
            metrics::counter!("yms_logins_total", "outcome" => "disabled").increment(1);
            return Err(DomainError::Forbidden("Account is disabled".into()));
        }

        if !self.hasher.verify(password, &user.password_hash) {
            metrics::counter!("yms_logins_total", "outcome" => "bad_password").increment(1);
            return Err(DomainError::Unauthorized("Your password is wrong".into()));
        }

        user.record_login(self.clock.now());
        let user = self.users.update_user(&user).await?;

        metrics::counter!("yms_logins_total", "outcome" => "success").increment(1);
        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    // ── Administration ──────────────────────────────────────────

    pub async fn list_users(&self, mut dto: GetUserDto) -> DomainResult<PaginatedResult<User>> {
        let (page, page_size) = validate_pagination(dto.page, dto.page_size);
        dto.page = Some(page);
        dto.page_size = Some(page_size);
        dto.search = dto
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        dto.role = dto.role.map(|r| {
            self.roles
                .resolve(&r)
                .map(|role| role.name.clone())
                .unwrap_or(r)
        });
        self.users.list_users(dto).await
    }

    pub async fn user_stats(&self) -> DomainResult<UserStats> {
        self.users.user_stats(ADMINISTRATOR_ROLE).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        self.users.get_user_by_id(id).await
    }

    /// Flip `is_active`. Administrators cannot switch themselves off.
    pub async fn toggle_active(&self, actor_id: &str, user_id: &str) -> DomainResult<User> {
        if actor_id == user_id {
            return Err(DomainError::Validation(
                "You cannot change the active status of your own account.".into(),
            ));
        }

        let mut user = self.require_user(user_id).await?;
        let active = !user.is_active;
        user.set_active(active, self.clock.now());
        let user = self.users.update_user(&user).await?;

        info!(user_id = %user.id, is_active = active, actor = %actor_id, "User activation toggled");
        Ok(user)
    }

    pub async fn reassign_role(&self, user_id: &str, role_name: &str) -> DomainResult<User> {
        let mut user = self.require_user(user_id).await?;
        let role = self
            .roles
            .resolve(role_name)
            .ok_or_else(|| DomainError::NotFound {
                entity: "Role",
                field: "name",
                value: role_name.trim().to_string(),
            })?;

        user.assign_role(role.name.clone(), self.clock.now());
        let user = self.users.update_user(&user).await?;

        info!(user_id = %user.id, role = %user.role_name, "Role reassigned");
        Ok(user)
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn require_user(&self, id: &str) -> DomainResult<User> {
        self.users
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found("id", id))
    }

    /// Duplicate check then role lookup, in that order.
    async fn resolve_role_for_create(&self, email: &str, role_name: &str) -> DomainResult<Role> {
        if self.users.get_user_by_email(email).await?.is_some() {
            return Err(DomainError::Conflict("Email already registered.".into()));
        }

        self.roles
            .resolve(role_name)
            .cloned()
            .ok_or_else(|| DomainError::RoleNotFound(role_name.to_string()))
    }

    async fn create_pending(
        &self,
        email: String,
        display_name: Option<String>,
        password_hash: String,
        role: Role,
    ) -> DomainResult<(User, String)> {
        let now = self.clock.now();
        let code = generate_verification_code();
        let display_name = display_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let user = User::new_pending(
            email,
            display_name,
            password_hash,
            role.name,
            PendingVerification {
                code: code.clone(),
                expires_at: now + self.code_ttl,
            },
            now,
        );

        // The directory's uniqueness guarantee settles concurrent registrations.
        let user = self.users.create_user(user).await?;
        Ok((user, code))
    }

    async fn dispatch(&self, message: OutboundEmail, context: &str) -> DomainResult<()> {
        let to = message.to_address.clone();
        self.notifier.send(message).await.map_err(|e| {
            metrics::counter!("yms_notifications_failed_total").increment(1);
            warn!(to = %to, error = %e, "Notification dispatch failed");
            DomainError::NotificationFailed(format!("{}: {}", context, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::{DateTime, Utc};

    use crate::domain::{AccountState, DEFAULT_ROLES};
    use crate::infrastructure::crypto::password::BcryptHasher;
    use crate::infrastructure::mail::InMemoryMailbox;
    use crate::infrastructure::storage::InMemoryUserRepository;

    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Utc::now())))
        }

        fn advance(&self, by: Duration) {
            *self.0.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    struct Fixture {
        service: AccountService,
        users: Arc<InMemoryUserRepository>,
        mailbox: Arc<InMemoryMailbox>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let mailbox = Arc::new(InMemoryMailbox::new());
        let clock = ManualClock::new();
        let service = AccountService::new(
            users.clone(),
            Arc::new(RoleCatalog::from_names(DEFAULT_ROLES)),
            Arc::new(BcryptHasher::new(4)),
            mailbox.clone(),
        )
        .with_clock(clock.clone());

        Fixture {
            service,
            users,
            mailbox,
            clock,
        }
    }

    fn register_cmd(email: &str) -> RegisterCommand {
        RegisterCommand {
            email: email.to_string(),
            password: "Secret1!".to_string(),
            role: "Yard Manager".to_string(),
            display_name: Some("Alice".to_string()),
        }
    }

    async fn stored(f: &Fixture, email: &str) -> User {
        f.users.get_user_by_email(email).await.unwrap().unwrap()
    }

    async fn stored_code(f: &Fixture, email: &str) -> String {
        stored(f, email)
            .await
            .pending_verification
            .expect("pending code")
            .code
    }

    #[tokio::test]
    async fn registration_starts_pending_with_fifteen_minute_code() {
        let f = fixture();
        let user = f.service.register(register_cmd("A@X.com")).await.unwrap();

        assert_eq!(user.email, "a@x.com");
        assert!(!user.is_active);
        assert!(!user.email_confirmed);
        assert_eq!(user.state(), AccountState::PendingVerification);
        assert_eq!(user.role_name, "Yard Manager");

        let pending = user.pending_verification.clone().unwrap();
        assert!(is_well_formed_code(&pending.code));
        assert_eq!(pending.expires_at, f.clock.now() + Duration::minutes(15));

        let sent = f.mailbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_address, "a@x.com");
        assert!(sent[0].body.contains(&pending.code));
    }

    #[tokio::test]
    async fn registration_validates_input() {
        let f = fixture();

        let mut missing_role = register_cmd("a@x.com");
        missing_role.role = "  ".into();
        assert!(matches!(
            f.service.register(missing_role).await,
            Err(DomainError::Validation(_))
        ));

        let mut missing_password = register_cmd("a@x.com");
        missing_password.password = String::new();
        assert!(matches!(
            f.service.register(missing_password).await,
            Err(DomainError::Validation(_))
        ));

        let mut weak = register_cmd("a@x.com");
        weak.password = "password".into();
        assert!(matches!(
            f.service.register(weak).await,
            Err(DomainError::Validation(_))
        ));

        let mut unknown_role = register_cmd("a@x.com");
        unknown_role.role = "Harbour Master".into();
        assert!(matches!(
            f.service.register(unknown_role).await,
            Err(DomainError::RoleNotFound(_))
        ));

        assert!(f.mailbox.sent().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let f = fixture();
        f.service.register(register_cmd("a@x.com")).await.unwrap();

        let err = f.service.register(register_cmd(" A@X.COM ")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn concurrent_registrations_yield_one_conflict() {
        let f = fixture();
        let (a, b) = tokio::join!(
            f.service.register(register_cmd("race@x.com")),
            f.service.register(register_cmd("RACE@x.com")),
        );

        let results = [a, b];
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(DomainError::Conflict(_))))
            .count();
        assert_eq!(ok, 1);
        assert_eq!(conflicts, 1);
    }

    #[tokio::test]
    async fn mail_failure_keeps_the_account() {
        let f = fixture();
        f.mailbox.set_failing(true);

        let err = f.service.register(register_cmd("a@x.com")).await.unwrap_err();
        match err {
            DomainError::NotificationFailed(msg) => {
                assert!(msg.starts_with("Registration saved but email failed"))
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let user = stored(&f, "a@x.com").await;
        assert!(user.pending_verification.is_some());

        // Recoverable through resend once mail works again
        f.mailbox.set_failing(false);
        assert_eq!(
            f.service.resend_verification("a@x.com").await.unwrap(),
            ResendOutcome::Sent
        );
    }

    #[tokio::test]
    async fn verify_activates_and_is_idempotent() {
        let f = fixture();
        f.service.register(register_cmd("a@x.com")).await.unwrap();
        let code = stored_code(&f, "a@x.com").await;

        let outcome = f.service.verify_email("a@x.com", &code).await.unwrap();
        assert_eq!(outcome, VerificationOutcome::Verified);

        let user = stored(&f, "a@x.com").await;
        assert!(user.is_active);
        assert!(user.email_confirmed);
        assert!(user.pending_verification.is_none());

        let again = f.service.verify_email("a@x.com", &code).await.unwrap();
        assert_eq!(again, VerificationOutcome::AlreadyVerified);
    }

    #[tokio::test]
    async fn verify_rejects_expired_code() {
        let f = fixture();
        f.service.register(register_cmd("a@x.com")).await.unwrap();
        let code = stored_code(&f, "a@x.com").await;

        f.clock.advance(Duration::minutes(15));
        let err = f.service.verify_email("a@x.com", &code).await.unwrap_err();
        assert!(matches!(err, DomainError::Expired));

        let user = stored(&f, "a@x.com").await;
        assert!(!user.is_active);
        assert!(!user.email_confirmed);
    }

    #[tokio::test]
    async fn verify_distinguishes_mismatch_from_format() {
        let f = fixture();
        f.service.register(register_cmd("a@x.com")).await.unwrap();
        let code = stored_code(&f, "a@x.com").await;
        let wrong = if code == "000000" { "000001" } else { "000000" };

        assert!(matches!(
            f.service.verify_email("a@x.com", wrong).await,
            Err(DomainError::Mismatch)
        ));
        assert!(matches!(
            f.service.verify_email("a@x.com", "12345").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            f.service.verify_email("a@x.com", "12a456").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            f.service.verify_email("nobody@x.com", &code).await,
            Err(DomainError::NotFound { .. })
        ));

        // Spaces inside a pasted code are tolerated
        let spaced = format!("{} {}", &code[..3], &code[3..]);
        assert_eq!(
            f.service.verify_email("a@x.com", &spaced).await.unwrap(),
            VerificationOutcome::Verified
        );
    }

    #[tokio::test]
    async fn verify_without_pending_code_is_a_validation_error() {
        let f = fixture();
        f.service.register(register_cmd("a@x.com")).await.unwrap();

        let mut user = stored(&f, "a@x.com").await;
        user.pending_verification = None;
        f.users.update_user(&user).await.unwrap();

        assert!(matches!(
            f.service.verify_email("a@x.com", "123456").await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn resend_invalidates_previous_code() {
        let f = fixture();
        f.service.register(register_cmd("a@x.com")).await.unwrap();
        let old_code = stored_code(&f, "a@x.com").await;

        f.clock.advance(Duration::minutes(10));
        let mut new_code = old_code.clone();
        while new_code == old_code {
            f.service.resend_verification("a@x.com").await.unwrap();
            new_code = stored_code(&f, "a@x.com").await;
        }

        assert!(matches!(
            f.service.verify_email("a@x.com", &old_code).await,
            Err(DomainError::Mismatch)
        ));

        // The new code has its own fifteen minutes
        f.clock.advance(Duration::minutes(14));
        assert_eq!(
            f.service.verify_email("a@x.com", &new_code).await.unwrap(),
            VerificationOutcome::Verified
        );
    }

    #[tokio::test]
    async fn resend_for_verified_or_unknown_accounts() {
        let f = fixture();
        f.service.register(register_cmd("a@x.com")).await.unwrap();
        let code = stored_code(&f, "a@x.com").await;
        f.service.verify_email("a@x.com", &code).await.unwrap();

        assert_eq!(
            f.service.resend_verification("a@x.com").await.unwrap(),
            ResendOutcome::AlreadyVerified
        );
        assert!(matches!(
            f.service.resend_verification("ghost@x.com").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn resend_mail_failure_keeps_new_code() {
        let f = fixture();
        f.service.register(register_cmd("a@x.com")).await.unwrap();
        let old_code = stored_code(&f, "a@x.com").await;

        f.mailbox.set_failing(true);
        let err = f.service.resend_verification("a@x.com").await.unwrap_err();
        assert!(matches!(err, DomainError::NotificationFailed(_)));

        let pending = stored(&f, "a@x.com").await.pending_verification.unwrap();
        assert_eq!(pending.expires_at, f.clock.now() + Duration::minutes(15));
        if pending.code != old_code {
            assert!(matches!(
                f.service.verify_email("a@x.com", &old_code).await,
                Err(DomainError::Mismatch)
            ));
        }
        assert_eq!(
            f.service.verify_email("a@x.com", &pending.code).await.unwrap(),
            VerificationOutcome::Verified
        );
    }

    #[tokio::test]
    async fn login_before_verification_never_checks_password() {
        let f = fixture();
        f.service.register(register_cmd("a@x.com")).await.unwrap();

        for password in ["Secret1!", "definitely wrong"] {
            match f.service.login("A@x.com", password).await {
                Err(DomainError::NeedsVerification { email }) => assert_eq!(email, "a@x.com"),
                other => panic!("unexpected: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn login_rejections_are_distinguishable() {
        let f = fixture();
        f.service.register(register_cmd("a@x.com")).await.unwrap();
        let code = stored_code(&f, "a@x.com").await;
        f.service.verify_email("a@x.com", &code).await.unwrap();

        assert!(matches!(
            f.service.login("a@x.com", "Wrong123!").await,
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(
            f.service.login("nobody@x.com", "Secret1!").await,
            Err(DomainError::NotFound { .. })
        ));

        let user = stored(&f, "a@x.com").await;
        f.service.toggle_active("admin-id", &user.id).await.unwrap();

        let err = f.service.login("a@x.com", "Secret1!").await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn login_success_records_last_login() {
        let f = fixture();
        f.service.register(register_cmd("a@x.com")).await.unwrap();
        let code = stored_code(&f, "a@x.com").await;
        f.service.verify_email("a@x.com", &code).await.unwrap();

        let user = f.service.login("a@x.com", "Secret1!").await.unwrap();
        assert_eq!(user.role_name, "Yard Manager");
        assert_eq!(user.last_login_at, Some(f.clock.now()));
    }

    #[tokio::test]
    async fn admin_created_user_gets_temporary_password() {
        let f = fixture();
        let user = f
            .service
            .create_user_as_admin(AdminCreateUserCommand {
                email: "jockey@x.com".into(),
                role: "yard jockey".into(),
                display_name: Some("Jo".into()),
            })
            .await
            .unwrap();

        assert_eq!(user.role_name, "Yard Jockey");
        assert_eq!(user.state(), AccountState::PendingVerification);

        let sent = f.mailbox.sent();
        assert_eq!(sent.len(), 1);
        let temp_password = sent[0]
            .body
            .lines()
            .find_map(|l| l.strip_prefix("Temporary password: "))
            .unwrap()
            .to_string();
        let code = user.pending_verification.unwrap().code;

        f.service.verify_email("jockey@x.com", &code).await.unwrap();
        let logged_in = f.service.login("jockey@x.com", &temp_password).await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn toggle_active_and_reassign_role() {
        let f = fixture();
        let user = f.service.register(register_cmd("a@x.com")).await.unwrap();

        let toggled = f.service.toggle_active("admin-id", &user.id).await.unwrap();
        assert!(toggled.is_active);
        let toggled = f.service.toggle_active("admin-id", &user.id).await.unwrap();
        assert!(!toggled.is_active);

        assert!(matches!(
            f.service.toggle_active(&user.id, &user.id).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            f.service.toggle_active("admin-id", "missing").await,
            Err(DomainError::NotFound { .. })
        ));

        let updated = f.service.reassign_role(&user.id, "GATE security").await.unwrap();
        assert_eq!(updated.role_name, "Gate Security");
        assert!(matches!(
            f.service.reassign_role(&user.id, "Captain").await,
            Err(DomainError::NotFound { entity: "Role", .. })
        ));
        assert!(matches!(
            f.service.reassign_role("missing", "View Only").await,
            Err(DomainError::NotFound { entity: "User", .. })
        ));
    }

    #[tokio::test]
    async fn stats_count_pending_and_administrators() {
        let f = fixture();
        f.service.register(register_cmd("a@x.com")).await.unwrap();
        let mut admin = register_cmd("boss@x.com");
        admin.role = "Administrator".into();
        f.service.register(admin).await.unwrap();
        let code = stored_code(&f, "boss@x.com").await;
        f.service.verify_email("boss@x.com", &code).await.unwrap();

        let stats = f.service.user_stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.administrators, 1);
        assert_eq!(stats.pending_verification, 1);
    }
}
