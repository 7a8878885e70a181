//! In-memory `UserRepository`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository, UserUniqueField};
use crate::domain::{Email, StudentCode, User, UserId, UserPatch};

/// `UserRepository` keeping accounts in a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<UserId, User>>, UserPersistenceError> {
        self.users
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.guard()?;
        for existing in users.values() {
            if existing.email == user.email {
                return Err(UserPersistenceError::duplicate(UserUniqueField::Email));
            }
            if user.student_code.is_some() && existing.student_code == user.student_code {
                return Err(UserPersistenceError::duplicate(UserUniqueField::StudentCode));
            }
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.guard()?.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .guard()?
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn find_by_student_code(
        &self,
        code: &StudentCode,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .guard()?
            .values()
            .find(|user| user.student_code.as_ref() == Some(code))
            .cloned())
    }

    async fn update(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut users = self.guard()?;
        Ok(users.get_mut(id).map(|user| {
            patch.apply(user);
            user.clone()
        }))
    }

    async fn delete(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.guard()?.remove(id))
    }
}
