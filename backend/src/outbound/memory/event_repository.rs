//! In-memory `EventRepository`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{EventPersistenceError, EventRepository};
use crate::domain::{Event, EventCode, EventId, EventPatch};

/// `EventRepository` keeping events in a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    events: Mutex<HashMap<EventId, Event>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<EventId, Event>>, EventPersistenceError> {
        self.events
            .lock()
            .map_err(|_| EventPersistenceError::query("event store lock poisoned"))
    }
}

fn sorted_by<K: Ord>(mut events: Vec<Event>, key: impl Fn(&Event) -> K) -> Vec<Event> {
    events.sort_by_key(key);
    events
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create(&self, event: &Event) -> Result<(), EventPersistenceError> {
        let mut events = self.guard()?;
        if events.values().any(|e| e.event_code == event.event_code) {
            return Err(EventPersistenceError::duplicate_code(
                event.event_code.to_string(),
            ));
        }
        events.insert(event.id, event.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventPersistenceError> {
        Ok(self.guard()?.get(id).cloned())
    }

    async fn find_by_code(&self, code: &EventCode) -> Result<Vec<Event>, EventPersistenceError> {
        let matches = self
            .guard()?
            .values()
            .filter(|event| &event.event_code == code)
            .cloned()
            .collect();
        Ok(sorted_by(matches, |event| event.created_at))
    }

    async fn list(&self) -> Result<Vec<Event>, EventPersistenceError> {
        let all = self.guard()?.values().cloned().collect();
        Ok(sorted_by(all, |event| (event.starts_at, *event.id.as_uuid())))
    }

    async fn update(
        &self,
        id: &EventId,
        patch: &EventPatch,
    ) -> Result<Option<Event>, EventPersistenceError> {
        let mut events = self.guard()?;
        Ok(events.get_mut(id).map(|event| {
            patch.apply(event);
            event.clone()
        }))
    }

    async fn delete(&self, id: &EventId) -> Result<Option<Event>, EventPersistenceError> {
        Ok(self.guard()?.remove(id))
    }
}
