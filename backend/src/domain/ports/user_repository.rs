//! Port abstraction for user persistence adapters and their errors.
use std::fmt;

use async_trait::async_trait;

use crate::domain::{Email, StudentCode, User, UserId, UserPatch};

use super::define_port_error;

/// User columns guarded by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserUniqueField {
    Email,
    StudentCode,
}

impl fmt::Display for UserUniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Email => "email",
            Self::StudentCode => "student code",
        })
    }
}

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique column already holds the submitted value.
        Duplicate { field: UserUniqueField } => "{field} already exists",
    }
}

/// Storage for user accounts.
///
/// `update` and `delete` act on a single row and report a missing row as
/// `Ok(None)` rather than an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record.
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by student code.
    async fn find_by_student_code(
        &self,
        code: &StudentCode,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Apply an allow-listed patch and return the updated record.
    async fn update(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Remove a user and return the removed record.
    async fn delete(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;
}
