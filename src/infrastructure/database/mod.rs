pub mod entities;
pub mod migrator;
pub mod repositories;
pub mod seed;

pub use repositories::SeaOrmUserRepository;
pub use seed::{seed_admin, seed_roles};

use tracing::info;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./yms.db?mode=rwc")
    pub url: String,
    /// Pool size override; `sqlite::memory:` must stay on one connection
    pub max_connections: Option<u32>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./yms.db?mode=rwc".to_string(),
            max_connections: None,
        }
    }
}

impl DatabaseConfig {
    /// Private in-memory database, used by tests
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: Some(1),
        }
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.url);
    let mut options = ConnectOptions::new(config.url.clone());
    if let Some(max) = config.max_connections {
        options.max_connections(max).min_connections(max);
    }
    options.sqlx_logging(false);
    let db = Database::connect(options).await?;
    info!("Database connected successfully");
    Ok(db)
}
