//! Password hashing and session tokens

pub mod password;
pub mod session;

pub use password::BcryptHasher;
pub use session::{IssuedSession, SessionClaims, SessionConfig, SessionIssuer};
