//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod attachment_store;
mod event_repository;
mod events;
mod login_service;
mod password_hasher;
mod user_accounts;
mod user_repository;

#[cfg(test)]
pub use attachment_store::MockAttachmentStore;
pub use attachment_store::{AttachmentStore, AttachmentStoreError, FixtureAttachmentStore};
#[cfg(test)]
pub use event_repository::MockEventRepository;
pub use event_repository::{EventPersistenceError, EventRepository};
#[cfg(test)]
pub use events::{MockEventCommand, MockEventQuery};
pub use events::{CreateEventRequest, EventCommand, EventQuery};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{FixturePasswordHasher, PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use user_accounts::{MockUserCommand, MockUserQuery};
pub use user_accounts::{UserCommand, UserQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository, UserUniqueField};
