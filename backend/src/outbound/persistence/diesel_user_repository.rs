//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Updates and deletes run as single `... RETURNING` statements so a row that
//! vanishes between lookup and mutation is reported as absent, not as an
//! error.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository, UserUniqueField};
use crate::domain::{Email, PasswordDigest, StudentCode, User, UserId, UserPatch};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const STUDENT_CODE_CONSTRAINT: &str = "users_student_code_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::Query(message) => UserPersistenceError::query(message),
        DieselFailure::UniqueViolation(constraint) => {
            let field = match constraint.as_deref() {
                Some(STUDENT_CODE_CONSTRAINT) => UserUniqueField::StudentCode,
                _ => UserUniqueField::Email,
            };
            UserPersistenceError::duplicate(field)
        }
    }
}

fn user_to_row(user: &User) -> UserRow {
    UserRow {
        id: *user.id.as_uuid(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.to_string(),
        password_hash: user.password_digest.as_str().to_owned(),
        is_external: user.is_external,
        profile_pic_url: user.profile_pic_url.clone(),
        student_code: user.student_code.as_ref().map(ToString::to_string),
        course: user.course.clone(),
        semester_of_entry: user.semester_of_entry.clone(),
        date_of_birth: user.date_of_birth,
        created_at: user.created_at,
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let email = Email::new(&row.email)
        .map_err(|err| UserPersistenceError::query(format!("stored email invalid: {err}")))?;
    let student_code = row
        .student_code
        .as_deref()
        .map(StudentCode::new)
        .transpose()
        .map_err(|err| UserPersistenceError::query(format!("stored student code invalid: {err}")))?;

    Ok(User {
        id: UserId::from_uuid(row.id),
        first_name: row.first_name,
        last_name: row.last_name,
        email,
        password_digest: PasswordDigest::new(row.password_hash),
        is_external: row.is_external,
        profile_pic_url: row.profile_pic_url,
        student_code,
        course: row.course,
        semester_of_entry: row.semester_of_entry,
        date_of_birth: row.date_of_birth,
        created_at: row.created_at,
    })
}

fn patch_to_changeset(patch: &UserPatch) -> UserChangeset<'_> {
    UserChangeset {
        first_name: patch.first_name.as_deref(),
        last_name: patch.last_name.as_deref(),
        profile_pic_url: patch.profile_pic_url.as_deref(),
        course: patch.course.as_deref(),
        semester_of_entry: patch.semester_of_entry.as_deref(),
        date_of_birth: patch.date_of_birth,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&user_to_row(user))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_student_code(
        &self,
        code: &StudentCode,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::student_code.eq(code.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn update(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        // Diesel rejects empty changesets.
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = diesel::update(users::table.find(id.as_uuid()))
            .set(&patch_to_changeset(patch))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = diesel::delete(users::table.find(id.as_uuid()))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rstest::rstest;

    fn sample_user() -> User {
        User {
            id: UserId::random(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: Email::new("ada@example.org").expect("email"),
            password_digest: PasswordDigest::new("$argon2id$v=19$stub"),
            is_external: false,
            profile_pic_url: Some("https://example.org/ada.png".into()),
            student_code: Some(StudentCode::new("2023001").expect("code")),
            course: Some("Mathematics".into()),
            semester_of_entry: Some("2023.1".into()),
            date_of_birth: NaiveDate::from_ymd_opt(2001, 4, 9),
            created_at: Utc
                .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                .single()
                .expect("timestamp"),
        }
    }

    #[rstest]
    fn rows_round_trip_to_domain_users() {
        let user = sample_user();
        let restored = row_to_user(user_to_row(&user)).expect("valid row");
        assert_eq!(restored, user);
    }

    #[rstest]
    fn corrupt_email_rows_surface_as_query_errors() {
        let mut row = user_to_row(&sample_user());
        row.email = "broken".into();
        assert!(matches!(
            row_to_user(row),
            Err(UserPersistenceError::Query { .. })
        ));
    }

    #[rstest]
    fn changeset_carries_only_patched_fields() {
        let patch = UserPatch {
            course: Some("Physics".into()),
            ..UserPatch::default()
        };
        let changeset = patch_to_changeset(&patch);
        assert_eq!(changeset.course, Some("Physics"));
        assert!(changeset.first_name.is_none());
        assert!(changeset.date_of_birth.is_none());
    }

    #[rstest]
    #[case(PoolError::checkout("timed out"))]
    #[case(PoolError::build("bad url"))]
    fn pool_failures_are_connection_errors(#[case] error: PoolError) {
        assert!(matches!(
            map_pool_error(error),
            UserPersistenceError::Connection { .. }
        ));
    }
}
