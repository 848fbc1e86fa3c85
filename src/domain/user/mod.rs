//! User aggregate
//!
//! Contains the User entity, query DTOs, and repository interface.

pub mod model;
pub mod repository;

mod dto_get;

pub use model::{AccountState, PendingVerification, User};

pub use dto_get::{GetUserDto, UserStats, UserStatusFilter};

pub use repository::UserRepositoryInterface;
