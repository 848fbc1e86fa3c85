use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

use crate::domain::{
    DomainError, DomainResult, GetUserDto, PendingVerification, User, UserRepositoryInterface,
    UserStats, UserStatusFilter,
};
use crate::infrastructure::database::entities::user;
use crate::shared::{validate_pagination, InfraError, PaginatedResult};

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> User {
    let pending_verification = match (model.verification_code, model.verification_expires_at) {
        (Some(code), Some(expires_at)) => Some(PendingVerification { code, expires_at }),
        _ => None,
    };

    User {
        id: model.id,
        email: model.email,
        display_name: model.display_name,
        password_hash: model.password_hash,
        role_name: model.role_name,
        is_active: model.is_active,
        email_confirmed: model.email_confirmed,
        pending_verification,
        created_at: model.created_at,
        updated_at: model.updated_at,
        last_login_at: model.last_login_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    InfraError::Database(e).into()
}

fn is_unique_violation(e: &sea_orm::DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn status_condition(status: UserStatusFilter) -> Condition {
    match status {
        UserStatusFilter::Active => Condition::all()
            .add(user::Column::EmailConfirmed.eq(true))
            .add(user::Column::IsActive.eq(true)),
        UserStatusFilter::Inactive => Condition::all()
            .add(user::Column::EmailConfirmed.eq(true))
            .add(user::Column::IsActive.eq(false)),
        UserStatusFilter::PendingVerification => {
            Condition::all().add(user::Column::EmailConfirmed.eq(false))
        }
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for SeaOrmUserRepository {
    async fn create_user(&self, user: User) -> DomainResult<User> {
        let (code, expires_at) = match &user.pending_verification {
            Some(p) => (Some(p.code.clone()), Some(p.expires_at)),
            None => (None, None),
        };

        let new_user = user::ActiveModel {
            id: Set(user.id),
            email: Set(user.email),
            display_name: Set(user.display_name),
            password_hash: Set(user.password_hash),
            role_name: Set(user.role_name),
            is_active: Set(user.is_active),
            email_confirmed: Set(user.email_confirmed),
            verification_code: Set(code),
            verification_expires_at: Set(expires_at),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
            last_login_at: Set(user.last_login_at),
        };

        let model = new_user.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::Conflict("Email already registered.".to_string())
            } else {
                db_err(e)
            }
        })?;

        Ok(user_model_to_domain(model))
    }

    async fn list_users(&self, dto: GetUserDto) -> DomainResult<PaginatedResult<User>> {
        let (page, page_size) = validate_pagination(dto.page, dto.page_size);

        let mut query = user::Entity::find();

        // Email is stored lowercase; display names are matched case-insensitively
        if let Some(ref search) = dto.search {
            let needle = search.to_lowercase();
            query = query.filter(
                Condition::any()
                    .add(user::Column::Email.contains(&needle))
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::DisplayName)))
                            .like(format!("%{}%", needle)),
                    ),
            );
        }

        if let Some(ref role) = dto.role {
            query = query.filter(user::Column::RoleName.eq(role.as_str()));
        }

        if let Some(status) = dto.status {
            query = query.filter(status_condition(status));
        }

        query = query
            .order_by_desc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Email);

        // Count total
        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        // Paginate
        let offset = ((page - 1) * page_size) as u64;
        let models = query
            .offset(offset)
            .limit(page_size as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items: Vec<User> = models.into_iter().map(user_model_to_domain).collect();

        Ok(PaginatedResult::new(items, total, page, page_size))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn user_stats(&self, admin_role: &str) -> DomainResult<UserStats> {
        let total = user::Entity::find().count(&self.db).await.map_err(db_err)?;

        let active = user::Entity::find()
            .filter(status_condition(UserStatusFilter::Active))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        let pending_verification = user::Entity::find()
            .filter(status_condition(UserStatusFilter::PendingVerification))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        let administrators = user::Entity::find()
            .filter(user::Column::RoleName.eq(admin_role))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(UserStats {
            total,
            active,
            administrators,
            pending_verification,
        })
    }

    async fn update_user(&self, user: &User) -> DomainResult<User> {
        let existing = user::Entity::find_by_id(user.id.as_str())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::user_not_found("id", &user.id));
        };

        let (code, expires_at) = match &user.pending_verification {
            Some(p) => (Some(p.code.clone()), Some(p.expires_at)),
            None => (None, None),
        };

        let mut active: user::ActiveModel = existing.into();
        active.display_name = Set(user.display_name.clone());
        active.password_hash = Set(user.password_hash.clone());
        active.role_name = Set(user.role_name.clone());
        active.is_active = Set(user.is_active);
        active.email_confirmed = Set(user.email_confirmed);
        active.verification_code = Set(code);
        active.verification_expires_at = Set(expires_at);
        active.updated_at = Set(user.updated_at);
        active.last_login_at = Set(user.last_login_at);

        let updated = active.update(&self.db).await.map_err(db_err)?;

        Ok(user_model_to_domain(updated))
    }
}
