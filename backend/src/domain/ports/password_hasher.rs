//! Port for one-way password hashing.
use async_trait::async_trait;

use crate::domain::PasswordDigest;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing or verification could not run.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password.
    async fn hash(&self, password: &str) -> Result<PasswordDigest, PasswordHashError>;

    /// Check a plaintext password against a stored digest.
    async fn verify(
        &self,
        password: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError>;
}

/// Reversible stand-in used by tests and local fixtures. Not a real hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePasswordHasher;

const FIXTURE_PREFIX: &str = "fixture$";

#[async_trait]
impl PasswordHasher for FixturePasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordDigest, PasswordHashError> {
        Ok(PasswordDigest::new(format!("{FIXTURE_PREFIX}{password}")))
    }

    async fn verify(
        &self,
        password: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError> {
        Ok(digest.as_str().strip_prefix(FIXTURE_PREFIX) == Some(password))
    }
}
