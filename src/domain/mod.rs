//! Domain layer: identity aggregates and their repository contracts.

pub mod role;
pub mod user;

pub use role::{Role, RoleCatalog, ADMINISTRATOR_ROLE, DEFAULT_ROLES};
pub use user::{
    AccountState, GetUserDto, PendingVerification, User, UserRepositoryInterface, UserStats,
    UserStatusFilter,
};

pub use crate::shared::errors::{DomainError, DomainResult};
