//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the repository ports backed by PostgreSQL via
//! Diesel with async support through `diesel-async` and `bb8` pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. No business logic resides here.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//! - **Typed errors**: every database failure maps to the port's error enum.
//!
//! # Example
//!
//! ```no_run
//! use campus_events::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/campus")).await?;
//! let users = DieselUserRepository::new(pool);
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_event_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_event_repository::DieselEventRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
