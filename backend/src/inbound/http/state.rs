//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{EventCommand, EventQuery, LoginService, UserCommand, UserQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserCommand>,
    pub users_query: Arc<dyn UserQuery>,
    pub events: Arc<dyn EventCommand>,
    pub events_query: Arc<dyn EventQuery>,
}

/// Parameter object bundling every port implementation.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserCommand>,
    pub users_query: Arc<dyn UserQuery>,
    pub events: Arc<dyn EventCommand>,
    pub events_query: Arc<dyn EventQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            users,
            users_query,
            events,
            events_query,
        } = ports;
        Self {
            login,
            users,
            users_query,
            events,
            events_query,
        }
    }
}

impl HttpState {
    /// Build state from a single service implementing every user port and a
    /// single service implementing every event port.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use campus_events::domain::ports::{FixtureAttachmentStore, FixturePasswordHasher};
    /// use campus_events::domain::{EventService, UserAccountService};
    /// use campus_events::inbound::http::state::HttpState;
    /// use campus_events::outbound::memory::{InMemoryEventRepository, InMemoryUserRepository};
    ///
    /// let accounts = Arc::new(UserAccountService::new(
    ///     Arc::new(InMemoryUserRepository::new()),
    ///     Arc::new(FixturePasswordHasher),
    ///     Arc::new(mockable::DefaultClock),
    /// ));
    /// let events = Arc::new(EventService::new(
    ///     Arc::new(InMemoryEventRepository::new()),
    ///     Arc::new(FixtureAttachmentStore),
    ///     Arc::new(mockable::DefaultClock),
    /// ));
    /// let _state = HttpState::from_services(accounts, events);
    /// ```
    pub fn from_services<U, E>(accounts: Arc<U>, events: Arc<E>) -> Self
    where
        U: LoginService + UserCommand + UserQuery + 'static,
        E: EventCommand + EventQuery + 'static,
    {
        Self {
            login: accounts.clone(),
            users: accounts.clone(),
            users_query: accounts,
            events: events.clone(),
            events_query: events,
        }
    }
}
