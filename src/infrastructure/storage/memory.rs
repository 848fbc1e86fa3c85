//! In-memory user directory

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{
    DomainError, DomainResult, GetUserDto, User, UserRepositoryInterface, UserStats,
    UserStatusFilter,
};
use crate::shared::{validate_pagination, PaginatedResult};

/// In-memory user directory for development and testing
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
    /// email → user id; the entry API makes the uniqueness check atomic
    emails: DashMap<String, String>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(user: &User, dto: &GetUserDto) -> bool {
    if let Some(role) = &dto.role {
        if &user.role_name != role {
            return false;
        }
    }

    if let Some(status) = dto.status {
        let ok = match status {
            UserStatusFilter::Active => user.email_confirmed && user.is_active,
            UserStatusFilter::Inactive => user.email_confirmed && !user.is_active,
            UserStatusFilter::PendingVerification => !user.email_confirmed,
        };
        if !ok {
            return false;
        }
    }

    if let Some(search) = &dto.search {
        let needle = search.to_lowercase();
        let in_name = user
            .display_name
            .as_deref()
            .map(|n| n.to_lowercase().contains(&needle))
            .unwrap_or(false);
        if !user.email.contains(&needle) && !in_name {
            return false;
        }
    }

    true
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn create_user(&self, user: User) -> DomainResult<User> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict("Email already registered.".into())),
            Entry::Vacant(slot) => {
                slot.insert(user.id.clone());
                self.users.insert(user.id.clone(), user.clone());
                Ok(user)
            }
        }
    }

    async fn list_users(&self, dto: GetUserDto) -> DomainResult<PaginatedResult<User>> {
        let (page, limit) = validate_pagination(dto.page, dto.page_size);

        let mut matching: Vec<User> = self
            .users
            .iter()
            .filter(|u| matches_filter(u.value(), &dto))
            .map(|u| u.value().clone())
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.email.cmp(&b.email))
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .collect();

        Ok(PaginatedResult::new(items, total, page, limit))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let id = match self.emails.get(email) {
            Some(id) => id.value().clone(),
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    async fn user_stats(&self, admin_role: &str) -> DomainResult<UserStats> {
        let mut stats = UserStats::default();
        for entry in self.users.iter() {
            let user = entry.value();
            stats.total += 1;
            if user.email_confirmed && user.is_active {
                stats.active += 1;
            }
            if !user.email_confirmed {
                stats.pending_verification += 1;
            }
            if user.role_name == admin_role {
                stats.administrators += 1;
            }
        }
        Ok(stats)
    }

    async fn update_user(&self, user: &User) -> DomainResult<User> {
        match self.users.get_mut(&user.id) {
            Some(mut stored) => {
                // Email is immutable after creation
                let email = stored.email.clone();
                *stored = user.clone();
                stored.email = email;
                Ok(stored.clone())
            }
            None => Err(DomainError::user_not_found("id", &user.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use crate::domain::PendingVerification;

    fn user(email: &str, role: &str, offset_secs: i64) -> User {
        let now = Utc::now() + Duration::seconds(offset_secs);
        User::new_pending(
            email.into(),
            None,
            "hash".into(),
            role.into(),
            PendingVerification {
                code: "123456".into(),
                expires_at: now + Duration::minutes(15),
            },
            now,
        )
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(user("a@x.com", "View Only", 0)).await.unwrap();

        let err = repo
            .create_user(user("a@x.com", "View Only", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_filters_and_paginates_newest_first() {
        let repo = InMemoryUserRepository::new();
        for i in 0..5 {
            repo.create_user(user(&format!("u{i}@x.com"), "View Only", i))
                .await
                .unwrap();
        }
        let mut admin = user("boss@x.com", "Administrator", 10);
        admin.confirm_email(Utc::now());
        repo.create_user(admin).await.unwrap();

        let page = repo
            .list_users(GetUserDto {
                role: Some("View Only".into()),
                page: Some(1),
                page_size: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items[0].email, "u4@x.com");

        let active = repo
            .list_users(GetUserDto {
                status: Some(UserStatusFilter::Active),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(active.total, 1);

        let search = repo
            .list_users(GetUserDto {
                search: Some("U3".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(search.items.len(), 1);

        let stats = repo.user_stats("Administrator").await.unwrap();
        assert_eq!(stats.total, 6);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.administrators, 1);
        assert_eq!(stats.pending_verification, 5);
    }

    #[tokio::test]
    async fn update_requires_existing_user() {
        let repo = InMemoryUserRepository::new();
        let missing = user("ghost@x.com", "View Only", 0);
        assert!(matches!(
            repo.update_user(&missing).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
