//! PostgreSQL-backed `EventRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{EventPersistenceError, EventRepository};
use crate::domain::{Event, EventAttachment, EventCode, EventId, EventPatch, UserId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{EventChangeset, EventRow};
use super::pool::{DbPool, PoolError};
use super::schema::events;

/// Diesel-backed implementation of the `EventRepository` port.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EventPersistenceError {
    EventPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error, code: Option<&EventCode>) -> EventPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => EventPersistenceError::connection(message),
        DieselFailure::Query(message) => EventPersistenceError::query(message),
        DieselFailure::UniqueViolation(_) => EventPersistenceError::duplicate_code(
            code.map(ToString::to_string).unwrap_or_default(),
        ),
    }
}

fn map_query_error(error: diesel::result::Error) -> EventPersistenceError {
    map_diesel_error(error, None)
}

fn event_to_row(event: &Event) -> Result<EventRow, EventPersistenceError> {
    let attachment = event.attachment.as_ref();
    let attachment_size_bytes = attachment
        .map(|a| i64::try_from(a.size_bytes))
        .transpose()
        .map_err(|_| EventPersistenceError::query("attachment size out of range"))?;

    Ok(EventRow {
        id: *event.id.as_uuid(),
        event_code: event.event_code.to_string(),
        title: event.title.clone(),
        description: event.description.clone(),
        location: event.location.clone(),
        starts_at: event.starts_at,
        ends_at: event.ends_at,
        attachment_file_name: attachment.map(|a| a.file_name.clone()),
        attachment_content_type: attachment.and_then(|a| a.content_type.clone()),
        attachment_size_bytes,
        attachment_storage_key: attachment.map(|a| a.storage_key.clone()),
        created_by: *event.created_by.as_uuid(),
        created_at: event.created_at,
    })
}

fn row_to_event(row: EventRow) -> Result<Event, EventPersistenceError> {
    let event_code = EventCode::new(&row.event_code)
        .map_err(|err| EventPersistenceError::query(format!("stored event code invalid: {err}")))?;

    let attachment = match (
        row.attachment_file_name,
        row.attachment_size_bytes,
        row.attachment_storage_key,
    ) {
        (Some(file_name), Some(size), Some(storage_key)) => Some(EventAttachment {
            file_name,
            content_type: row.attachment_content_type,
            size_bytes: u64::try_from(size)
                .map_err(|_| EventPersistenceError::query("stored attachment size negative"))?,
            storage_key,
        }),
        _ => None,
    };

    Ok(Event {
        id: EventId::from_uuid(row.id),
        event_code,
        title: row.title,
        description: row.description,
        location: row.location,
        starts_at: row.starts_at,
        ends_at: row.ends_at,
        attachment,
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
    })
}

fn rows_to_events(rows: Vec<EventRow>) -> Result<Vec<Event>, EventPersistenceError> {
    rows.into_iter().map(row_to_event).collect()
}

fn patch_to_changeset(patch: &EventPatch) -> EventChangeset<'_> {
    EventChangeset {
        title: patch.title.as_deref(),
        description: patch.description.as_deref(),
        location: patch.location.as_deref(),
        starts_at: patch.starts_at,
        ends_at: patch.ends_at,
    }
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn create(&self, event: &Event) -> Result<(), EventPersistenceError> {
        let row = event_to_row(event)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(events::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(&event.event_code)))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<EventRow> = events::table
            .find(id.as_uuid())
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        row.map(row_to_event).transpose()
    }

    async fn find_by_code(&self, code: &EventCode) -> Result<Vec<Event>, EventPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<EventRow> = events::table
            .filter(events::event_code.eq(code.as_ref()))
            .order(events::created_at.asc())
            .select(EventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;
        rows_to_events(rows)
    }

    async fn list(&self) -> Result<Vec<Event>, EventPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<EventRow> = events::table
            .order((events::starts_at.asc(), events::id.asc()))
            .select(EventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;
        rows_to_events(rows)
    }

    async fn update(
        &self,
        id: &EventId,
        patch: &EventPatch,
    ) -> Result<Option<Event>, EventPersistenceError> {
        // Diesel rejects empty changesets.
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<EventRow> = diesel::update(events::table.find(id.as_uuid()))
            .set(&patch_to_changeset(patch))
            .returning(EventRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        row.map(row_to_event).transpose()
    }

    async fn delete(&self, id: &EventId) -> Result<Option<Event>, EventPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<EventRow> = diesel::delete(events::table.find(id.as_uuid()))
            .returning(EventRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        row.map(row_to_event).transpose()
    }
}
