//! Driving ports for event use-cases.

use async_trait::async_trait;

use crate::domain::{AttachmentUpload, Error, Event, EventCode, EventDraft, EventId, EventPatch, UserId};

/// Input of the event-creation use case.
#[derive(Debug, Clone)]
pub struct CreateEventRequest {
    pub draft: EventDraft,
    pub attachment: Option<AttachmentUpload>,
    /// Authenticated caller recorded as the event owner.
    pub created_by: UserId,
}

/// Mutating event operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventCommand: Send + Sync {
    /// Create an event, storing its attachment and assigning a code.
    async fn create(&self, request: CreateEventRequest) -> Result<Event, Error>;

    /// Apply an allow-listed patch.
    async fn edit(&self, id: &EventId, patch: EventPatch) -> Result<Event, Error>;

    /// Remove an event.
    async fn delete(&self, id: &EventId) -> Result<(), Error>;
}

/// Read-only event operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventQuery: Send + Sync {
    /// Fetch one event by id.
    async fn by_id(&self, id: &EventId) -> Result<Event, Error>;

    /// Fetch the events sharing a code. Never returns an empty list.
    async fn by_code(&self, code: &EventCode) -> Result<Vec<Event>, Error>;

    /// Fetch every event. Empty when none exist.
    async fn list(&self) -> Result<Vec<Event>, Error>;
}
