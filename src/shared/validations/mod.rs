//! Input normalization and validation helpers shared by the services.

/// Minimum accepted password length
pub const PASSWORD_MIN_LENGTH: usize = 8;
/// Maximum accepted password length (bcrypt only uses the first 72 bytes)
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Trim and lowercase an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check the password policy. Returns a human-readable reason on failure.
pub fn check_password_policy(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LENGTH
        ));
    }
    if len > PASSWORD_MAX_LENGTH {
        return Err(format!(
            "Password must be at most {} characters",
            PASSWORD_MAX_LENGTH
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }
    if password.chars().all(|c| c.is_alphanumeric()) {
        return Err("Password must contain at least one non-alphanumeric character".to_string());
    }
    Ok(())
}

/// Build a display name from an explicit username or first/last name parts.
pub fn compose_display_name(
    username: Option<&str>,
    first: Option<&str>,
    last: Option<&str>,
) -> Option<String> {
    let username = username.map(str::trim).unwrap_or_default();
    if !username.is_empty() {
        return Some(username.to_string());
    }

    let first = first.map(str::trim).unwrap_or_default();
    let last = last.map(str::trim).unwrap_or_default();
    let joined = format!("{} {}", first, last);
    let joined = joined.trim();

    (!joined.is_empty()).then(|| joined.to_string())
}

pub fn validate_pagination(page: Option<u32>, limit: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(20).clamp(1, 100);
    (page, limit)
}
