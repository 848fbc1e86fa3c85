//! Email templates for the account lifecycle

use crate::application::ports::OutboundEmail;

pub const VERIFICATION_SUBJECT: &str = "Verify your email";
pub const WELCOME_SUBJECT: &str = "Your YMS account";

fn greeting_name<'a>(display_name: Option<&'a str>, email: &'a str) -> &'a str {
    display_name.filter(|n| !n.trim().is_empty()).unwrap_or(email)
}

pub fn verification_email(
    email: &str,
    display_name: Option<&str>,
    code: &str,
    ttl_minutes: i64,
) -> OutboundEmail {
    let name = greeting_name(display_name, email);
    OutboundEmail {
        to_address: email.to_string(),
        to_name: display_name.map(str::to_string),
        subject: VERIFICATION_SUBJECT.to_string(),
        body: format!(
            "Hi {name},\n\n\
             Your verification code is: {code}\n\n\
             This code expires in {ttl_minutes} minutes.\n\n\
             If you didn't create this account, you can ignore this email."
        ),
    }
}

/// Sent to accounts created by an administrator. The temporary password
/// appears here and nowhere else.
pub fn welcome_email(
    email: &str,
    display_name: Option<&str>,
    role_name: &str,
    temporary_password: &str,
    code: &str,
    ttl_minutes: i64,
) -> OutboundEmail {
    let name = greeting_name(display_name, email);
    OutboundEmail {
        to_address: email.to_string(),
        to_name: display_name.map(str::to_string),
        subject: WELCOME_SUBJECT.to_string(),
        body: format!(
            "Hi {name},\n\n\
             An administrator created a YMS account for you with the role \"{role_name}\".\n\n\
             Temporary password: {temporary_password}\n\
             Verification code: {code}\n\n\
             Verify your email within {ttl_minutes} minutes, then sign in with the \
             temporary password. If the code expires you can request a new one from the \
             verification page."
        ),
    }
}
