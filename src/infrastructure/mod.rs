//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod mail;
pub mod storage;

pub use database::{init_database, DatabaseConfig, SeaOrmUserRepository};
pub use mail::create_dispatcher;
pub use storage::InMemoryUserRepository;
