//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local repositories for development and tests
//! - **attachments**: filesystem storage for event attachments
//! - **password**: argon2id password hashing
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod attachments;
pub mod memory;
pub mod password;
pub mod persistence;
