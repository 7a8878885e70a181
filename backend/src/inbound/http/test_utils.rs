//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use crate::domain::ports::{
    MockEventCommand, MockEventQuery, MockLoginService, MockUserCommand, MockUserQuery,
};
use crate::domain::{Email, Event, EventCode, EventId, PasswordDigest, StudentCode, User, UserId};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie set by a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0)
        .single()
        .expect("fixture timestamp")
}

/// Non-external user with every optional field populated.
pub fn sample_user() -> User {
    User {
        id: UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id"),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: Email::new("ada@example.org").expect("fixture email"),
        password_digest: PasswordDigest::new("fixture$hunter2"),
        is_external: false,
        profile_pic_url: Some("https://example.org/ada.png".into()),
        student_code: Some(StudentCode::new("2023001").expect("fixture code")),
        course: Some("Mathematics".into()),
        semester_of_entry: Some("2023.1".into()),
        date_of_birth: chrono::NaiveDate::from_ymd_opt(2001, 4, 9),
        created_at: fixture_time(),
    }
}

pub fn sample_event() -> Event {
    Event {
        id: EventId::new("9b2f8a9c-6d1e-4c1a-9f53-2f1f0d6b7a10").expect("fixture id"),
        event_code: EventCode::new("ROBOT").expect("fixture code"),
        title: "Robotics meetup".into(),
        description: Some("Bring a laptop".into()),
        location: Some("Hall B".into()),
        starts_at: fixture_time(),
        ends_at: None,
        attachment: None,
        created_by: sample_user().id,
        created_at: fixture_time(),
    }
}

/// Mocked driving ports; unconfigured mocks panic when called.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub users: MockUserCommand,
    pub users_query: MockUserQuery,
    pub events: MockEventCommand,
    pub events_query: MockEventQuery,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState::from(HttpStatePorts {
            login: Arc::new(self.login),
            users: Arc::new(self.users),
            users_query: Arc::new(self.users_query),
            events: Arc::new(self.events),
            events_query: Arc::new(self.events_query),
        })
    }
}

pub const MULTIPART_BOUNDARY: &str = "campus-boundary";

/// One part of a hand-built `multipart/form-data` body.
pub struct FormPart<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub body: &'a [u8],
}

/// Encode parts into a multipart body and its `Content-Type` header value.
pub fn multipart_body(parts: &[FormPart<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        let disposition = match part.file_name {
            Some(file_name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\n",
                part.name
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
        };
        body.extend_from_slice(disposition.as_bytes());
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.body);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    (
        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        body,
    )
}
