//! Password hashing utilities

use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::warn;

use crate::application::ports::PasswordHasher;
use crate::shared::{DomainResult, InfraError};

/// Hash a password using bcrypt
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

/// bcrypt-backed `PasswordHasher`
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> DomainResult<String> {
        hash_password(password, self.cost)
            .map_err(|e| InfraError::Crypto(e.to_string()).into())
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        match verify_password(password, hash) {
            Ok(ok) => ok,
            Err(e) => {
                warn!(error = %e, "Stored password hash could not be checked");
                false
            }
        }
    }
}
