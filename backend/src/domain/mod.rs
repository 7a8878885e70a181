//! Domain primitives, services, and ports.
//!
//! Purpose: Define strongly typed entities used by the API and persistence
//! layers, the services implementing the account and event use cases, and
//! the ports those services depend on.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - User, Event and their value types.
//! - UserAccountService, EventService: driving port implementations.

pub mod auth;
pub mod error;
pub mod event;
pub mod event_service;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_accounts;
pub mod user_registration;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode};
pub use self::event::{
    AttachmentUpload, Event, EventAttachment, EventCode, EventDraft, EventId, EventPatch,
    EventValidationError,
};
pub use self::event_service::EventService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Email, PasswordDigest, StudentCode, User, UserId, UserPatch, UserValidationError,
    parse_date_of_birth,
};
pub use self::user_accounts::UserAccountService;
pub use self::user_registration::{
    AffiliationField, RegistrationError, RegistrationRequest, ValidatedRegistration,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use campus_events::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("login required"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
