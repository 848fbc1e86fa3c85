//! Session authentication middleware for Axum

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use super::common::ErrorResponse;
use crate::application::identity::AccountService;
use crate::domain::{User, ADMINISTRATOR_ROLE};
use crate::infrastructure::crypto::SessionIssuer;

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingSession,
    InvalidSession,
    AccountUnavailable,
    InsufficientPermissions,
}

/// Session cookie attributes
#[derive(Clone, Debug)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
}

impl CookieSettings {
    /// `Set-Cookie` value for a new session. Without `max_age` the cookie
    /// lives for the browser session only.
    pub fn session_cookie(&self, token: &str, max_age: Option<i64>) -> String {
        let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", self.name, token);
        if let Some(secs) = max_age {
            cookie.push_str(&format!("; Max-Age={}", secs));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn cleared_cookie(&self) -> String {
        self.session_cookie("", Some(0))
    }
}

/// State shared by the session middleware
#[derive(Clone)]
pub struct SessionState {
    pub sessions: Arc<SessionIssuer>,
    pub accounts: Arc<AccountService>,
    pub cookie: CookieSettings,
}

/// The signed-in user, reloaded from the directory for this request
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.0.role_name == ADMINISTRATOR_ROLE
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Session token from the cookie, falling back to a Bearer header.
pub fn session_token<'a>(headers: &'a HeaderMap, cookie: &CookieSettings) -> Option<&'a str> {
    cookie_value(headers, &cookie.name).or_else(|| bearer_token(headers))
}

/// Resolves the session to a `CurrentUser`. Sessions whose user is gone,
/// disabled or unverified are rejected.
pub async fn session_middleware(
    State(state): State<SessionState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = session_token(request.headers(), &state.cookie) else {
        return auth_error_response(AuthError::MissingSession);
    };

    let claims = match state.sessions.validate(token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "Session rejected");
            return auth_error_response(AuthError::InvalidSession);
        }
    };

    let user = match state.accounts.get_user_by_id(&claims.sub).await {
        Ok(Some(user)) if user.can_sign_in() => user,
        Ok(_) => return auth_error_response(AuthError::AccountUnavailable),
        Err(e) => return super::error::ApiError(e).into_response(),
    };

    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

/// Must run inside `session_middleware`.
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    match request.extensions().get::<CurrentUser>() {
        Some(user) if user.is_admin() => next.run(request).await,
        Some(_) => auth_error_response(AuthError::InsufficientPermissions),
        None => auth_error_response(AuthError::MissingSession),
    }
}

/// Attach a `Set-Cookie` header to a response.
pub fn with_cookie(mut response: Response, cookie: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingSession => (StatusCode::UNAUTHORIZED, "Not signed in"),
        AuthError::InvalidSession => (StatusCode::UNAUTHORIZED, "Session is invalid or expired"),
        AuthError::AccountUnavailable => (StatusCode::UNAUTHORIZED, "Account is not available"),
        AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "Insufficient permissions"),
    };

    let code = if status == StatusCode::FORBIDDEN {
        "forbidden"
    } else {
        "unauthorized"
    };

    (status, Json(ErrorResponse::new(code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> CookieSettings {
        CookieSettings {
            name: "yms.auth".into(),
            secure: true,
        }
    }

    #[test]
    fn cookie_is_preferred_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "theme=dark; yms.auth=abc.def.ghi".parse().unwrap());
        headers.insert(header::AUTHORIZATION, "Bearer other".parse().unwrap());

        assert_eq!(session_token(&headers, &settings()), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_is_accepted_without_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer tok".parse().unwrap());
        assert_eq!(session_token(&headers, &settings()), Some("tok"));

        let empty = HeaderMap::new();
        assert_eq!(session_token(&empty, &settings()), None);
    }

    #[test]
    fn cookie_attributes() {
        let persistent = settings().session_cookie("tok", Some(3600));
        assert_eq!(
            persistent,
            "yms.auth=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600; Secure"
        );

        let browser_session = settings().session_cookie("tok", None);
        assert!(!browser_session.contains("Max-Age"));

        assert!(settings().cleared_cookie().starts_with("yms.auth=; "));
        assert!(settings().cleared_cookie().contains("Max-Age=0"));
    }
}
