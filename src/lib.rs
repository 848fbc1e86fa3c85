//! # YMS Identity Service
//!
//! Account lifecycle for the Yard Management System: self-service
//! registration, email verification with six-digit codes, login gating,
//! cookie sessions and administrator user management.
//!
//! ## Architecture
//!
//! - **domain**: users, roles and the repository contract
//! - **application**: `AccountService` and its outbound ports
//! - **infrastructure**: SQLite storage, bcrypt, session tokens, mail
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: errors, pagination, validation helpers, shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, SeaOrmUserRepository};

// Re-export API router
pub use interfaces::http::create_api_router;
