//! Startup seeding: role catalog and the first administrator

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, warn};

use crate::application::ports::PasswordHasher;
use crate::config::AdminConfig;
use crate::domain::{
    DomainError, DomainResult, PendingVerification, Role, RoleCatalog, User,
    UserRepositoryInterface, ADMINISTRATOR_ROLE,
};
use crate::infrastructure::database::entities::role;
use crate::shared::{check_password_policy, normalize_email};

/// Insert any missing roles, then load the full catalog.
pub async fn seed_roles(
    db: &DatabaseConnection,
    names: &[&str],
) -> Result<RoleCatalog, sea_orm::DbErr> {
    for name in names {
        let exists = role::Entity::find()
            .filter(role::Column::Name.eq(*name))
            .one(db)
            .await?
            .is_some();

        if !exists {
            role::ActiveModel {
                name: Set(name.to_string()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            info!(role = %name, "Role seeded");
        }
    }

    let roles = role::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|m| Role {
            id: m.id,
            name: m.name,
        })
        .collect();

    Ok(RoleCatalog::new(roles))
}

/// Create a verified, active administrator when the directory is empty.
/// Returns the created user, or `None` when users already exist.
pub async fn seed_admin(
    users: &dyn UserRepositoryInterface,
    hasher: &dyn PasswordHasher,
    admin: &AdminConfig,
) -> DomainResult<Option<User>> {
    let stats = users.user_stats(ADMINISTRATOR_ROLE).await?;
    if stats.total > 0 {
        return Ok(None);
    }

    let email = normalize_email(&admin.email);
    if email.is_empty() {
        return Err(DomainError::Validation("Admin email is not configured".into()));
    }
    if check_password_policy(&admin.password).is_err() {
        warn!("Configured admin password does not meet the password policy");
    }

    info!("Creating default admin user...");

    let now = Utc::now();
    let mut user = User::new_pending(
        email,
        Some(admin.display_name.clone()).filter(|n| !n.trim().is_empty()),
        hasher.hash(&admin.password)?,
        ADMINISTRATOR_ROLE.to_string(),
        PendingVerification {
            code: String::new(),
            expires_at: now,
        },
        now,
    );
    user.confirm_email(now);

    let user = users.create_user(user).await?;
    info!(email = %user.email, "Default admin created");
    info!("⚠️  Please change the admin password immediately!");
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm_migration::MigratorTrait;

    use crate::domain::DEFAULT_ROLES;
    use crate::infrastructure::crypto::BcryptHasher;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::{init_database, DatabaseConfig, SeaOrmUserRepository};

    #[tokio::test]
    async fn role_seeding_is_idempotent() {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let first = seed_roles(&db, &DEFAULT_ROLES).await.unwrap();
        let second = seed_roles(&db, &DEFAULT_ROLES).await.unwrap();

        assert_eq!(first.roles().len(), 5);
        assert_eq!(first.roles(), second.roles());
        assert!(second.resolve("yardmanager").is_some());
    }

    #[tokio::test]
    async fn admin_is_seeded_once() {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        seed_roles(&db, &DEFAULT_ROLES).await.unwrap();

        let repo = SeaOrmUserRepository::new(db);
        let hasher = BcryptHasher::new(4);
        let config = AdminConfig::default();

        let admin = seed_admin(&repo, &hasher, &config).await.unwrap().unwrap();
        assert!(admin.can_sign_in());
        assert_eq!(admin.role_name, ADMINISTRATOR_ROLE);
        assert!(hasher.verify(&config.password, &admin.password_hash));

        assert!(seed_admin(&repo, &hasher, &config).await.unwrap().is_none());
    }
}
