//! User account domain service.
//!
//! Implements registration, profile edits, removal, lookups, and password
//! login on top of the [`UserRepository`] and [`PasswordHasher`] ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    LoginService, PasswordHashError, PasswordHasher, UserCommand, UserPersistenceError, UserQuery,
    UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, RegistrationRequest, User, UserId, UserPatch, ValidatedRegistration,
};

const USER_NOT_FOUND: &str = "user not found";
const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account service implementing the user driving ports.
#[derive(Clone)]
pub struct UserAccountService<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<R, H> UserAccountService<R, H> {
    /// Create a new service over the given collaborators.
    pub fn new(users: Arc<R>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }
}

impl<R, H> UserAccountService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    fn map_persistence_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::Duplicate { field } => {
                Error::invalid_request(format!("{field} already exists"))
            }
        }
    }

    fn map_hash_error(error: PasswordHashError) -> Error {
        Error::internal(error.to_string())
    }

    async fn ensure_unique(&self, registration: &ValidatedRegistration) -> Result<(), Error> {
        if let Some(code) = &registration.student_code {
            let taken = self
                .users
                .find_by_student_code(code)
                .await
                .map_err(Self::map_persistence_error)?;
            if taken.is_some() {
                return Err(Error::invalid_request("student code already exists"));
            }
        }

        let taken = self
            .users
            .find_by_email(&registration.email)
            .await
            .map_err(Self::map_persistence_error)?;
        if taken.is_some() {
            return Err(Error::invalid_request("email already exists"));
        }
        Ok(())
    }

    async fn find_existing(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }
}

#[async_trait]
impl<R, H> UserCommand for UserAccountService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error> {
        let registration = request
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.ensure_unique(&registration).await?;

        let password_digest = self
            .hasher
            .hash(&registration.password)
            .await
            .map_err(Self::map_hash_error)?;

        let user = User {
            id: UserId::random(),
            first_name: registration.first_name,
            last_name: registration.last_name,
            email: registration.email,
            password_digest,
            is_external: registration.is_external,
            profile_pic_url: registration.profile_pic_url,
            student_code: registration.student_code,
            course: registration.course,
            semester_of_entry: registration.semester_of_entry,
            date_of_birth: registration.date_of_birth,
            created_at: self.clock.utc(),
        };

        self.users
            .create(&user)
            .await
            .map_err(Self::map_persistence_error)?;
        info!(user_id = %user.id, external = user.is_external, "user created");
        Ok(user)
    }

    async fn edit(&self, id: &UserId, patch: UserPatch) -> Result<User, Error> {
        let patch = patch
            .normalised()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if patch.is_empty() {
            return self.find_existing(id).await;
        }

        let updated = self
            .users
            .update(id, &patch)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))?;
        info!(user_id = %id, "user updated");
        Ok(updated)
    }

    async fn delete(&self, id: &UserId) -> Result<User, Error> {
        let deleted = self
            .users
            .delete(id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))?;
        info!(user_id = %id, "user deleted");
        Ok(deleted)
    }
}

#[async_trait]
impl<R, H> UserQuery for UserAccountService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn fetch(&self, id: &UserId) -> Result<User, Error> {
        self.find_existing(id).await
    }
}

#[async_trait]
impl<R, H> LoginService for UserAccountService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Some(user) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(Self::map_persistence_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &user.password_digest)
            .await
            .map_err(Self::map_hash_error)?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(user.id)
    }
}

#[cfg(test)]
#[path = "user_accounts_tests.rs"]
mod tests;
