//! Driving ports for user account use-cases.
//!
//! HTTP handlers depend on these traits only, so handler tests can swap in
//! mocks without wiring persistence or hashing.

use async_trait::async_trait;

use crate::domain::{Error, RegistrationRequest, User, UserId, UserPatch};

/// Mutating account operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Validate and persist a new account.
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error>;

    /// Apply an allow-listed patch to an existing account.
    async fn edit(&self, id: &UserId, patch: UserPatch) -> Result<User, Error>;

    /// Remove an account, returning the removed record.
    async fn delete(&self, id: &UserId) -> Result<User, Error>;
}

/// Read-only account operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserQuery: Send + Sync {
    /// Fetch a single account.
    async fn fetch(&self, id: &UserId) -> Result<User, Error>;
}
