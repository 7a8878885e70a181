//! Shared validation helpers for inbound HTTP adapters.

use actix_web::{HttpRequest, error::JsonPayloadError, web};
use serde_json::json;

use crate::domain::{Error, EventCode, EventId, UserId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidBody,
    InvalidField,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidBody => "invalid_body",
            ErrorCode::InvalidField => "invalid_field",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Attach the offending field to a validation message.
pub(crate) fn invalid_field_error(field: FieldName, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": ErrorCode::InvalidField.as_str(),
    }))
}

/// Parse a user id from a path segment.
///
/// Malformed ids cannot match a record, so they read as a missing user.
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| Error::not_found("user not found"))
}

/// Parse an event id from a path segment, reporting malformed ids as absent.
pub(crate) fn parse_event_id(raw: &str, message: &'static str) -> Result<EventId, Error> {
    EventId::new(raw).map_err(|_| Error::not_found(message))
}

/// Parse an event code from a path segment.
///
/// No stored event can carry a malformed code, so it reads as no match.
pub(crate) fn parse_event_code(raw: &str) -> Result<EventCode, Error> {
    EventCode::new(raw).map_err(|_| Error::not_found("invalid event code"))
}

/// Map JSON extractor failures onto the API error schema.
///
/// Unknown fields on allow-listed patches surface here as 400 responses.
pub(crate) fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "expected an application/json body".to_owned(),
        JsonPayloadError::Deserialize(inner) => format!("invalid request body: {inner}"),
        other => format!("invalid request body: {other}"),
    };
    Error::invalid_request(message)
        .with_details(json!({ "code": ErrorCode::InvalidBody.as_str() }))
        .into()
}

/// JSON extractor configuration shared by every API scope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    fn malformed_user_ids_read_as_missing(#[case] raw: &str) {
        let err = parse_user_id(raw).expect_err("malformed id");
        assert_eq!(err.code(), DomainErrorCode::NotFound);
        assert_eq!(err.message(), "user not found");
    }

    #[rstest]
    fn malformed_event_id_uses_supplied_message() {
        let err = parse_event_id("42", "invalid event id").expect_err("malformed id");
        assert_eq!(err.code(), DomainErrorCode::NotFound);
        assert_eq!(err.message(), "invalid event id");
    }

    #[rstest]
    #[case("AB")]
    #[case("a b")]
    fn malformed_event_codes_match_nothing(#[case] raw: &str) {
        let err = parse_event_code(raw).expect_err("malformed code");
        assert_eq!(err.code(), DomainErrorCode::NotFound);
        assert_eq!(err.message(), "invalid event code");
        assert!(err.details().is_none());
    }
}
