//! Process-local repositories.
//!
//! Used when no database URL is configured and by the end-to-end tests. They
//! enforce the same uniqueness rules as the PostgreSQL schema.

mod event_repository;
mod user_repository;

pub use event_repository::InMemoryEventRepository;
pub use user_repository::InMemoryUserRepository;
