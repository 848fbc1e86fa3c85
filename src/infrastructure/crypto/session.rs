//! Session tokens
//!
//! A session is a signed JWT carried in an HttpOnly cookie (or a Bearer
//! header for API clients). Logout revokes the token id until its natural
//! expiry.

use chrono::{Duration, Utc};
use dashmap::DashMap;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::User;
use crate::shared::InfraError;

pub const SESSION_ISSUER: &str = "yms-identity";

/// Session configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Session lifetime in hours
    pub ttl_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_hours: ttl_hours.max(1),
            issuer: SESSION_ISSUER.to_string(),
        }
    }
}

/// Session claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// Role at sign-in time; authorization re-reads the stored user
    pub role: String,
    /// Token id, used for revocation
    pub jti: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
}

/// Issued token together with its lifetime
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub max_age_secs: i64,
}

/// Signs, validates and revokes session tokens
pub struct SessionIssuer {
    config: SessionConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
    /// jti → exp of revoked tokens
    revoked: DashMap<String, i64>,
}

impl SessionIssuer {
    pub fn new(config: SessionConfig) -> Self {
        let encoding = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding,
            decoding,
            revoked: DashMap::new(),
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.config.ttl_hours * 3600
    }

    pub fn issue(&self, user: &User) -> Result<IssuedSession, InfraError> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.config.ttl_hours);

        let claims = SessionClaims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role_name.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(IssuedSession {
            token,
            max_age_secs: self.ttl_secs(),
        })
    }

    /// Verify signature, issuer and expiry, then the revocation list.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, InfraError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let claims = decode::<SessionClaims>(token, &self.decoding, &validation)?.claims;

        if self.revoked.contains_key(&claims.jti) {
            return Err(InfraError::Token(
                jsonwebtoken::errors::ErrorKind::InvalidToken.into(),
            ));
        }

        Ok(claims)
    }

    /// Revoke a token. Invalid or already expired tokens are ignored.
    pub fn revoke(&self, token: &str) {
        if let Ok(claims) = self.validate(token) {
            self.prune_revoked();
            self.revoked.insert(claims.jti.clone(), claims.exp);
            debug!(user_id = %claims.sub, "Session revoked");
        }
    }

    fn prune_revoked(&self) {
        let now = Utc::now().timestamp();
        self.revoked.retain(|_, exp| *exp > now);
    }
}
