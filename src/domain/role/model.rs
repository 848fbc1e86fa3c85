use serde::Serialize;

/// Role allowed to manage users
pub const ADMINISTRATOR_ROLE: &str = "Administrator";

/// Roles seeded at startup
pub const DEFAULT_ROLES: [&str; 5] = [
    ADMINISTRATOR_ROLE,
    "Gate Security",
    "Yard Manager",
    "Yard Jockey",
    "View Only",
];

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: i32,
    pub name: String,
}

/// Matching key for role names: all whitespace removed, lowercased.
pub fn normalize_role_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Immutable set of seeded roles
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    roles: Vec<Role>,
}

impl RoleCatalog {
    pub fn new(mut roles: Vec<Role>) -> Self {
        roles.sort_by_key(|r| r.id);
        Self { roles }
    }

    /// Catalog with sequential ids, for setups without a roles table.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let roles = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Role {
                id: i as i32 + 1,
                name: name.to_string(),
            })
            .collect();
        Self::new(roles)
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Resolve a user-supplied name to the canonical role.
    pub fn resolve(&self, requested: &str) -> Option<&Role> {
        let key = normalize_role_key(requested);
        if key.is_empty() {
            return None;
        }
        self.roles.iter().find(|r| normalize_role_key(&r.name) == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> RoleCatalog {
        RoleCatalog::from_names(DEFAULT_ROLES)
    }

    #[test]
    fn resolves_ignoring_case_and_whitespace() {
        let catalog = catalog();
        let role = catalog.resolve(" yard manager ").unwrap();
        assert_eq!(role.name, "Yard Manager");
        assert_eq!(catalog.resolve("YARDJOCKEY").unwrap().name, "Yard Jockey");
        assert_eq!(catalog.resolve("view\tonly").unwrap().name, "View Only");
    }

    #[test]
    fn unknown_or_blank_names_do_not_resolve() {
        let catalog = catalog();
        assert!(catalog.resolve("Supervisor").is_none());
        assert!(catalog.resolve("   ").is_none());
    }

    #[test]
    fn from_names_assigns_sequential_ids() {
        let catalog = catalog();
        assert_eq!(catalog.roles().len(), 5);
        assert_eq!(catalog.roles()[0].id, 1);
        assert_eq!(catalog.roles()[0].name, ADMINISTRATOR_ROLE);
        assert_eq!(catalog.roles()[1].name, "Gate Security");
    }
}
