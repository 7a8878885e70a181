//! Shared classification of Diesel failures for the repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Repository-neutral view of a Diesel failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum DieselFailure {
    Connection(&'static str),
    Query(&'static str),
    /// A unique index rejected the write; carries the constraint name.
    UniqueViolation(Option<String>),
}

pub(super) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation(info.constraint_name().map(str::to_owned))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error")
        }
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        _ => DieselFailure::Query("database error"),
    }
}
