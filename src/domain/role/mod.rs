//! Role catalog
//!
//! Roles are seeded once at startup and are read-only afterwards.

pub mod model;

pub use model::{normalize_role_key, Role, RoleCatalog, ADMINISTRATOR_ROLE, DEFAULT_ROLES};
