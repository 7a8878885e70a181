//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        first_name -> Varchar,
        last_name -> Varchar,
        /// Lower-cased; unique (`users_email_key`).
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Varchar,
        is_external -> Bool,
        profile_pic_url -> Nullable<Varchar>,
        /// Unique when present (`users_student_code_key`).
        student_code -> Nullable<Varchar>,
        course -> Nullable<Varchar>,
        semester_of_entry -> Nullable<Varchar>,
        date_of_birth -> Nullable<Date>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Campus events.
    events (id) {
        id -> Uuid,
        /// Unique (`events_event_code_key`).
        event_code -> Varchar,
        title -> Varchar,
        description -> Nullable<Text>,
        location -> Nullable<Varchar>,
        starts_at -> Timestamptz,
        ends_at -> Nullable<Timestamptz>,
        attachment_file_name -> Nullable<Varchar>,
        attachment_content_type -> Nullable<Varchar>,
        attachment_size_bytes -> Nullable<Int8>,
        attachment_storage_key -> Nullable<Varchar>,
        created_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, events);
