/// Status filter for directory listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatusFilter {
    Active,
    Inactive,
    PendingVerification,
}

impl UserStatusFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" | "disabled" => Some(Self::Inactive),
            "pending" | "pending_verification" => Some(Self::PendingVerification),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetUserDto {
    /// Matches email or display name
    pub search: Option<String>,
    /// Canonical role name
    pub role: Option<String>,
    pub status: Option<UserStatusFilter>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Totals shown on the user-management screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total: u64,
    pub active: u64,
    pub administrators: u64,
    pub pending_verification: u64,
}
