//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{events, users};

/// Row struct for reading and inserting users.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_external: bool,
    pub profile_pic_url: Option<String>,
    pub student_code: Option<String>,
    pub course: Option<String>,
    pub semester_of_entry: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Changeset for the allow-listed user fields. `None` leaves a column as is.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub profile_pic_url: Option<&'a str>,
    pub course: Option<&'a str>,
    pub semester_of_entry: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Row struct for reading and inserting events.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub event_code: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub attachment_file_name: Option<String>,
    pub attachment_content_type: Option<String>,
    pub attachment_size_bytes: Option<i64>,
    pub attachment_storage_key: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Changeset for the allow-listed event fields.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = events)]
pub(crate) struct EventChangeset<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub location: Option<&'a str>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}
