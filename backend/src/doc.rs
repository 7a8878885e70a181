//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint from the inbound layer, the
//! request/response DTOs, and the session cookie security scheme. Swagger UI
//! serves it in debug builds.

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::events::{
    AttachmentResponse, CreateEventForm, CreateEventPayload, CreatedEvent, EventPatchRequest,
    EventResponse, UpdatedEvent,
};
use crate::inbound::http::users::{
    CreateUserRequest, CreatedUser, DeletedUser, LoginRequest, UpdatedUser, UserPatchRequest,
    UserResponse,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus events API",
        description = "CRUD endpoints for users and events."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::edit_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::login,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::get_event,
        crate::inbound::http::events::get_events_by_code,
        crate::inbound::http::events::create_event,
        crate::inbound::http::events::edit_event,
        crate::inbound::http::events::delete_event,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CreateUserRequest,
        UserPatchRequest,
        UserResponse,
        CreatedUser,
        UpdatedUser,
        DeletedUser,
        LoginRequest,
        CreateEventPayload,
        CreateEventForm,
        EventPatchRequest,
        EventResponse,
        AttachmentResponse,
        CreatedEvent,
        UpdatedEvent,
    )),
    tags(
        (name = "users", description = "User registration and maintenance"),
        (name = "events", description = "Event lookup and maintenance"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
