//! Event domain service.
//!
//! Owns the event-creation use case: code assignment, attachment storage,
//! and persistence. Stored attachments are removed again when the event row
//! cannot be written, and when the event is deleted.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AttachmentStore, AttachmentStoreError, CreateEventRequest, EventCommand,
    EventPersistenceError, EventQuery, EventRepository,
};
use crate::domain::{Error, Event, EventAttachment, EventCode, EventId, EventPatch};

const EVENT_NOT_FOUND: &str = "event not found";
const CODE_TAKEN: &str = "event code already exists";
/// Attempts at drawing an unused generated code before giving up.
const CODE_ATTEMPTS: usize = 5;

/// Event service implementing the event driving ports.
#[derive(Clone)]
pub struct EventService<R, S> {
    events: Arc<R>,
    attachments: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<R, S> EventService<R, S> {
    /// Create a new service over the given collaborators.
    pub fn new(events: Arc<R>, attachments: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            events,
            attachments,
            clock,
        }
    }
}

impl<R, S> EventService<R, S>
where
    R: EventRepository,
    S: AttachmentStore,
{
    fn map_persistence_error(error: EventPersistenceError) -> Error {
        match error {
            EventPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("event repository unavailable: {message}"))
            }
            EventPersistenceError::Query { message } => {
                Error::internal(format!("event repository error: {message}"))
            }
            EventPersistenceError::DuplicateCode { .. } => Error::invalid_request(CODE_TAKEN),
        }
    }

    fn map_attachment_error(error: AttachmentStoreError) -> Error {
        match error {
            AttachmentStoreError::TooLarge { limit } => {
                Error::invalid_request(format!("attachment exceeds {limit} bytes"))
            }
            AttachmentStoreError::Io { message } => {
                Error::internal(format!("attachment storage error: {message}"))
            }
        }
    }

    async fn code_in_use(&self, code: &EventCode) -> Result<bool, Error> {
        let existing = self
            .events
            .find_by_code(code)
            .await
            .map_err(Self::map_persistence_error)?;
        Ok(!existing.is_empty())
    }

    async fn assign_code(&self, requested: Option<EventCode>) -> Result<EventCode, Error> {
        if let Some(code) = requested {
            if self.code_in_use(&code).await? {
                return Err(Error::invalid_request(CODE_TAKEN));
            }
            return Ok(code);
        }

        for _ in 0..CODE_ATTEMPTS {
            let candidate = EventCode::generate();
            if !self.code_in_use(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(Error::internal("could not allocate an event code"))
    }

    async fn discard_attachment(&self, attachment: &EventAttachment) {
        if let Err(err) = self.attachments.remove(&attachment.storage_key).await {
            warn!(
                storage_key = %attachment.storage_key,
                error = %err,
                "failed to remove event attachment"
            );
        }
    }

    async fn find_existing(&self, id: &EventId) -> Result<Event, Error> {
        self.events
            .find_by_id(id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Error::not_found(EVENT_NOT_FOUND))
    }
}

#[async_trait]
impl<R, S> EventCommand for EventService<R, S>
where
    R: EventRepository,
    S: AttachmentStore,
{
    async fn create(&self, request: CreateEventRequest) -> Result<Event, Error> {
        let CreateEventRequest {
            draft,
            attachment,
            created_by,
        } = request;

        let event_code = self.assign_code(draft.event_code).await?;
        let attachment = match attachment {
            Some(upload) => Some(
                self.attachments
                    .store(&upload)
                    .await
                    .map_err(Self::map_attachment_error)?,
            ),
            None => None,
        };

        let event = Event {
            id: EventId::random(),
            event_code,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            attachment,
            created_by,
            created_at: self.clock.utc(),
        };

        if let Err(err) = self.events.create(&event).await {
            if let Some(stored) = &event.attachment {
                self.discard_attachment(stored).await;
            }
            return Err(Self::map_persistence_error(err));
        }

        info!(
            event_id = %event.id,
            event_code = %event.event_code,
            created_by = %event.created_by,
            "event created"
        );
        Ok(event)
    }

    async fn edit(&self, id: &EventId, patch: EventPatch) -> Result<Event, Error> {
        let patch = patch
            .normalised()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if patch.is_empty() {
            return self.find_existing(id).await;
        }
        if patch.touches_schedule() {
            let current = self.find_existing(id).await?;
            patch
                .check_against(&current)
                .map_err(|err| Error::invalid_request(err.to_string()))?;
        }

        let updated = self
            .events
            .update(id, &patch)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Error::not_found(EVENT_NOT_FOUND))?;
        info!(event_id = %id, "event updated");
        Ok(updated)
    }

    async fn delete(&self, id: &EventId) -> Result<(), Error> {
        let deleted = self
            .events
            .delete(id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Error::not_found(EVENT_NOT_FOUND))?;
        if let Some(attachment) = &deleted.attachment {
            self.discard_attachment(attachment).await;
        }
        info!(event_id = %id, "event deleted");
        Ok(())
    }
}

#[async_trait]
impl<R, S> EventQuery for EventService<R, S>
where
    R: EventRepository,
    S: AttachmentStore,
{
    async fn by_id(&self, id: &EventId) -> Result<Event, Error> {
        self.events
            .find_by_id(id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Error::not_found("invalid event id"))
    }

    async fn by_code(&self, code: &EventCode) -> Result<Vec<Event>, Error> {
        let events = self
            .events
            .find_by_code(code)
            .await
            .map_err(Self::map_persistence_error)?;
        if events.is_empty() {
            return Err(Error::not_found("invalid event code"));
        }
        Ok(events)
    }

    async fn list(&self) -> Result<Vec<Event>, Error> {
        self.events
            .list()
            .await
            .map_err(Self::map_persistence_error)
    }
}

#[cfg(test)]
#[path = "event_service_tests.rs"]
mod tests;
