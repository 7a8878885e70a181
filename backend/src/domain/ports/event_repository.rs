//! Port abstraction for event persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Event, EventCode, EventId, EventPatch};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by event repository adapters.
    pub enum EventPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "event repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "event repository query failed: {message}",
        /// The event code is already taken.
        DuplicateCode { code: String } => "event code {code} already exists",
    }
}

/// Storage for events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert a new event.
    async fn create(&self, event: &Event) -> Result<(), EventPersistenceError>;

    /// Fetch an event by identifier.
    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventPersistenceError>;

    /// Fetch every event carrying `code`, oldest first.
    async fn find_by_code(&self, code: &EventCode) -> Result<Vec<Event>, EventPersistenceError>;

    /// Fetch all events, ordered by start time.
    async fn list(&self) -> Result<Vec<Event>, EventPersistenceError>;

    /// Apply an allow-listed patch in a single statement.
    async fn update(
        &self,
        id: &EventId,
        patch: &EventPatch,
    ) -> Result<Option<Event>, EventPersistenceError>;

    /// Remove an event and return the removed record.
    async fn delete(&self, id: &EventId) -> Result<Option<Event>, EventPersistenceError>;
}
