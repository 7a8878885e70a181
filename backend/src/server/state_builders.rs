//! Builders wiring outbound adapters into the HTTP state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use campus_events::domain::ports::{EventRepository, UserRepository};
use campus_events::domain::{EventService, UserAccountService};
use campus_events::inbound::http::state::HttpState;
use campus_events::outbound::attachments::FsAttachmentStore;
use campus_events::outbound::memory::{InMemoryEventRepository, InMemoryUserRepository};
use campus_events::outbound::password::Argon2PasswordHasher;
use campus_events::outbound::persistence::{DieselEventRepository, DieselUserRepository};

use super::ServerConfig;

fn assemble<U, E>(
    users: Arc<U>,
    events: Arc<E>,
    attachments: Arc<FsAttachmentStore>,
    clock: Arc<dyn Clock>,
) -> HttpState
where
    U: UserRepository + 'static,
    E: EventRepository + 'static,
{
    let accounts = Arc::new(UserAccountService::new(
        users,
        Arc::new(Argon2PasswordHasher),
        clock.clone(),
    ));
    let events = Arc::new(EventService::new(events, attachments, clock));
    HttpState::from_services(accounts, events)
}

/// Build HTTP state from configuration.
///
/// Uses Diesel repositories when a pool is configured, otherwise in-memory
/// repositories that lose their contents on restart.
///
/// # Errors
/// Returns [`std::io::Error`] when the upload directory cannot be opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let attachments = Arc::new(FsAttachmentStore::open(
        &config.upload_dir,
        config.max_upload_bytes as u64,
    )?);
    info!(dir = %config.upload_dir.display(), "attachment store ready");
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let state = match &config.db_pool {
        Some(pool) => assemble(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselEventRepository::new(pool.clone())),
            attachments,
            clock,
        ),
        None => {
            warn!("no database configured; using in-memory repositories");
            assemble(
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryEventRepository::new()),
                attachments,
                clock,
            )
        }
    };
    Ok(state)
}
