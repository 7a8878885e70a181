//! Events API handlers.
//!
//! ```text
//! GET    /api/v1/events
//! GET    /api/v1/events/{id}
//! GET    /api/v1/events/code/{code}
//! POST   /api/v1/events            multipart: data={...}, file=<bytes>
//! PATCH  /api/v1/events/{id}       {"title":"..."}
//! DELETE /api/v1/events/{id}
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::CreateEventRequest;
use crate::domain::{Error, Event, EventAttachment, EventDraft, EventPatch, EventValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::multipart::{UploadLimit, read_event_form};
use crate::inbound::http::session::CallerSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_event_code, parse_event_id};

/// JSON payload carried in the `data` part of the creation form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventPayload {
    pub event_code: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl TryFrom<CreateEventPayload> for EventDraft {
    type Error = EventValidationError;

    fn try_from(value: CreateEventPayload) -> Result<Self, Self::Error> {
        Self::try_new(
            value.event_code.as_deref(),
            &value.title,
            value.description,
            value.location,
            value.starts_at,
            value.ends_at,
        )
    }
}

/// OpenAPI shape of the event creation form.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CreateEventForm {
    /// JSON-encoded [`CreateEventPayload`].
    data: String,
    #[schema(value_type = Option<String>, format = Binary)]
    file: Option<Vec<u8>>,
}

/// Allow-listed body for `PATCH /api/v1/events/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EventPatchRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl From<EventPatchRequest> for EventPatch {
    fn from(value: EventPatchRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
            location: value.location,
            starts_at: value.starts_at,
            ends_at: value.ends_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: u64,
}

impl From<&EventAttachment> for AttachmentResponse {
    fn from(value: &EventAttachment) -> Self {
        Self {
            file_name: value.file_name.clone(),
            content_type: value.content_type.clone(),
            size_bytes: value.size_bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: String,
    pub event_code: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub attachment: Option<AttachmentResponse>,
    #[schema(value_type = String, format = Uuid)]
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Event> for EventResponse {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.to_string(),
            event_code: event.event_code.to_string(),
            title: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            attachment: event.attachment.as_ref().map(AttachmentResponse::from),
            created_by: event.created_by.to_string(),
            created_at: event.created_at,
        }
    }
}

fn to_responses(events: &[Event]) -> Vec<EventResponse> {
    events.iter().map(EventResponse::from).collect()
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatedEvent {
    pub created: EventResponse,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdatedEvent {
    pub updated: EventResponse,
}

fn map_validation_error(err: &EventValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

fn parse_payload(raw: &str) -> Result<CreateEventPayload, Error> {
    serde_json::from_str(raw).map_err(|err| {
        Error::invalid_request(format!("invalid event payload: {err}"))
            .with_details(json!({ "field": "data", "code": "invalid_body" }))
    })
}

/// List every event ordered by start time.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    responses(
        (status = 200, description = "Events", body = [EventResponse]),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Persistence unavailable", body = Error)
    ),
    tags = ["events"],
    operation_id = "getAllEvents"
)]
#[get("/events")]
pub async fn list_events(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<EventResponse>>> {
    let events = state.events_query.list().await?;
    Ok(web::Json(to_responses(&events)))
}

#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event", body = EventResponse),
        (status = 404, description = "Unknown event", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["events"],
    operation_id = "getEventById"
)]
#[get("/events/{id}")]
pub async fn get_event(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<EventResponse>> {
    let id = parse_event_id(&path, "invalid event id")?;
    let event = state.events_query.by_id(&id).await?;
    Ok(web::Json(EventResponse::from(&event)))
}

/// Look up events sharing a code.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use campus_events::inbound::http::events::get_events_by_code;
///
/// let app = App::new().service(get_events_by_code);
/// ```
#[utoipa::path(
    get,
    path = "/api/v1/events/code/{code}",
    params(("code" = String, Path, description = "Event code")),
    responses(
        (status = 200, description = "Matching events", body = [EventResponse]),
        (status = 404, description = "No matching events", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["events"],
    operation_id = "getEventByCode"
)]
#[get("/events/code/{code}")]
pub async fn get_events_by_code(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<EventResponse>>> {
    let code = parse_event_code(&path)?;
    let events = state.events_query.by_code(&code).await?;
    Ok(web::Json(to_responses(&events)))
}

/// Create an event on behalf of the logged-in user.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body(content = CreateEventForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Event created", body = CreatedEvent),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["events"],
    operation_id = "createEvent"
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    session: CallerSession,
    limit: Option<web::Data<UploadLimit>>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let created_by = session.require_caller()?;
    let limit = limit.map(|data| *data.get_ref()).unwrap_or_default();
    let form = read_event_form(payload, limit).await?;
    let draft =
        EventDraft::try_from(parse_payload(&form.data)?).map_err(|err| map_validation_error(&err))?;
    let event = state
        .events
        .create(CreateEventRequest {
            draft,
            attachment: form.file,
            created_by,
        })
        .await?;
    Ok(HttpResponse::Created().json(CreatedEvent {
        created: EventResponse::from(&event),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/v1/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    request_body = EventPatchRequest,
    responses(
        (status = 200, description = "Event updated", body = UpdatedEvent),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Event not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["events"],
    operation_id = "editEvent"
)]
#[patch("/events/{id}")]
pub async fn edit_event(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<EventPatchRequest>,
) -> ApiResult<web::Json<UpdatedEvent>> {
    let id = parse_event_id(&path, "event not found")?;
    let event = state.events.edit(&id, payload.into_inner().into()).await?;
    Ok(web::Json(UpdatedEvent {
        updated: EventResponse::from(&event),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["events"],
    operation_id = "deleteEvent"
)]
#[delete("/events/{id}")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_event_id(&path, "event not found")?;
    state.events.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests;
