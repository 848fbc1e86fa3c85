use async_trait::async_trait;

use super::{GetUserDto, User, UserStats};
use crate::shared::{DomainResult, PaginatedResult};

/// User directory. Email uniqueness is enforced by the implementation
/// itself; callers may pre-check but must handle `Conflict` from `create_user`.
#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Insert a new user. Fails with `DomainError::Conflict` on a duplicate email.
    async fn create_user(&self, user: User) -> DomainResult<User>;

    async fn list_users(&self, dto: GetUserDto) -> DomainResult<PaginatedResult<User>>;
    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn user_stats(&self, admin_role: &str) -> DomainResult<UserStats>;

    /// Persist all mutable fields of an existing user.
    async fn update_user(&self, user: &User) -> DomainResult<User>;
}
