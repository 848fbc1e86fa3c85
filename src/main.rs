//! YMS Identity Service
//!
//! REST API for account registration, email verification, sign-in and
//! user administration. Reads configuration from TOML
//! (~/.config/yms/config.toml, or the path in `YMS_CONFIG`).

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use yms_identity::application::identity::AccountService;
use yms_identity::config::{AppConfig, LogFormat};
use yms_identity::domain::DEFAULT_ROLES;
use yms_identity::infrastructure::crypto::{BcryptHasher, SessionConfig, SessionIssuer};
use yms_identity::infrastructure::database::migrator::Migrator;
use yms_identity::infrastructure::database::{seed_admin, seed_roles};
use yms_identity::infrastructure::mail::create_dispatcher;
use yms_identity::shared::shutdown::ShutdownCoordinator;
use yms_identity::{
    create_api_router, default_config_path, init_database, DatabaseConfig, SeaOrmUserRepository,
};

fn init_tracing(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("YMS_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg.logging.level, cfg.logging.format);
            if config_path.exists() {
                info!("Configuration loaded from {}", config_path.display());
            } else {
                warn!(
                    "No configuration at {}; using defaults",
                    config_path.display()
                );
            }
            cfg
        }
        Err(e) => {
            init_tracing("info", LogFormat::Pretty);
            error!("Failed to load config: {}. Using defaults.", e);
            let mut cfg = AppConfig::default();
            cfg.apply_env_overrides();
            cfg
        }
    };

    info!("Starting YMS identity service...");

    if app_cfg.security.session_secret == "change-me-in-production" {
        warn!("Using the default session secret; set SESSION_SECRET before deploying");
    }

    // ── Prometheus metrics recorder (before any metrics calls) ──
    let prometheus_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus metrics recorder installed");

    // ── Database ───────────────────────────────────────────────
    let db_config = DatabaseConfig {
        url: app_cfg.database.url.clone(),
        max_connections: None,
    };
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    let migrated = if app_cfg.database.reset_on_startup {
        warn!("database.reset_on_startup is set; dropping all tables");
        Migrator::fresh(&db).await
    } else {
        info!("Running database migrations...");
        Migrator::up(&db, None).await
    };
    if let Err(e) = migrated {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    let roles = seed_roles(&db, &DEFAULT_ROLES).await?;
    info!(count = roles.roles().len(), "Role catalog ready");

    // ── Services ───────────────────────────────────────────────
    let users = Arc::new(SeaOrmUserRepository::new(db.clone()));
    let hasher = Arc::new(BcryptHasher::new(app_cfg.security.bcrypt_cost));

    if let Some(admin) = seed_admin(users.as_ref(), hasher.as_ref(), &app_cfg.admin).await? {
        info!("Default admin created: {}", admin.email);
        warn!("Please change the admin password immediately!");
    }

    let notifier = create_dispatcher(&app_cfg.mail);
    info!(transport = ?app_cfg.mail.transport, "Mail dispatcher configured");

    let accounts = Arc::new(
        AccountService::new(users, Arc::new(roles), hasher, notifier)
            .with_code_ttl_minutes(app_cfg.verification.code_ttl_minutes),
    );

    let sessions = Arc::new(SessionIssuer::new(SessionConfig::new(
        app_cfg.security.session_secret.clone(),
        app_cfg.security.session_ttl_hours,
    )));
    info!(
        "Sessions configured with {}h expiration",
        app_cfg.security.session_ttl_hours
    );

    // ── Shutdown coordination ──────────────────────────────────
    let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
    let shutdown_signal = shutdown.signal();
    shutdown.start_signal_listener();

    // ── REST API ───────────────────────────────────────────────
    let api_router = create_api_router(
        accounts,
        sessions,
        db.clone(),
        &app_cfg,
        Some(prometheus_handle),
    );

    let api_addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let api_shutdown = shutdown_signal.clone();
    let served = axum::serve(listener, api_router)
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        })
        .await;

    if let Err(e) = served {
        error!("REST API server error: {}", e);
    }

    // ── Final cleanup ──────────────────────────────────────────
    shutdown
        .cleanup(move || async move {
            if let Err(e) = db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("Database connection closed");
            }
        })
        .await;

    info!("YMS identity service shutdown complete");
    Ok(())
}
