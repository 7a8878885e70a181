//! Event data model.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use uuid::Uuid;

use super::UserId;

/// Minimum length of an event code.
pub const EVENT_CODE_MIN: usize = 3;
/// Maximum length of an event code.
pub const EVENT_CODE_MAX: usize = 32;
/// Length of generated event codes.
pub const GENERATED_CODE_LEN: usize = 8;
/// Maximum length of an event title.
pub const TITLE_MAX: usize = 200;

/// Validation errors raised while building event values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventValidationError {
    #[error("event id must be a valid UUID")]
    InvalidId,
    #[error(
        "event code must be {min} to {max} letters, digits, hyphens, or underscores",
        min = EVENT_CODE_MIN,
        max = EVENT_CODE_MAX
    )]
    InvalidCode,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("endsAt must not be before startsAt")]
    EndsBeforeStart,
}

/// Stable event identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(Uuid);

impl EventId {
    /// Parse an identifier from its hyphenated form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, EventValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| EventValidationError::InvalidId)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Short human-shareable event code.
///
/// ## Invariants
/// - Between [`EVENT_CODE_MIN`] and [`EVENT_CODE_MAX`] characters.
/// - Only ASCII letters, digits, `-`, and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventCode(String);

impl EventCode {
    /// Validate an event code.
    ///
    /// # Examples
    /// ```
    /// use campus_events::domain::EventCode;
    ///
    /// assert!(EventCode::new("HACK-2025").is_ok());
    /// assert!(EventCode::new("no spaces").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EventValidationError> {
        let raw = raw.as_ref();
        let valid = (EVENT_CODE_MIN..=EVENT_CODE_MAX).contains(&raw.len())
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(EventValidationError::InvalidCode);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Generate a random upper-case alphanumeric code.
    pub fn generate() -> Self {
        let code = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_CODE_LEN)
            .map(|byte| char::from(byte).to_ascii_uppercase())
            .collect();
        Self(code)
    }
}

impl AsRef<str> for EventCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata of a stored event attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventAttachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: u64,
    /// Opaque key understood by the attachment store.
    pub storage_key: String,
}

/// File received alongside an event creation request.
#[derive(Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl fmt::Debug for AttachmentUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Persisted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub event_code: EventCode,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub attachment: Option<EventAttachment>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Validated event fields supplied by the caller on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub event_code: Option<EventCode>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl EventDraft {
    /// Validate raw creation fields.
    pub fn try_new(
        event_code: Option<&str>,
        title: &str,
        description: Option<String>,
        location: Option<String>,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
    ) -> Result<Self, EventValidationError> {
        let event_code = event_code
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(EventCode::new)
            .transpose()?;
        let title = validate_title(title)?;
        check_schedule(starts_at, ends_at)?;
        Ok(Self {
            event_code,
            title,
            description: trimmed_optional(description),
            location: trimmed_optional(location),
            starts_at,
            ends_at,
        })
    }
}

/// Allow-listed changes accepted by the edit-event operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Whether the patch moves the event in time.
    pub fn touches_schedule(&self) -> bool {
        self.starts_at.is_some() || self.ends_at.is_some()
    }

    /// Trim text fields and validate the title.
    pub fn normalised(self) -> Result<Self, EventValidationError> {
        let title = self.title.as_deref().map(validate_title).transpose()?;
        Ok(Self {
            title,
            description: self.description.map(|d| d.trim().to_owned()),
            location: self.location.map(|l| l.trim().to_owned()),
            ..self
        })
    }

    /// Check the schedule that would result from applying the patch to
    /// `current`.
    pub fn check_against(&self, current: &Event) -> Result<(), EventValidationError> {
        let starts_at = self.starts_at.unwrap_or(current.starts_at);
        let ends_at = self.ends_at.or(current.ends_at);
        check_schedule(starts_at, ends_at)
    }

    /// Apply the patch to an in-memory record.
    pub fn apply(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            event.description = Some(description.clone());
        }
        if let Some(location) = &self.location {
            event.location = Some(location.clone());
        }
        if let Some(starts_at) = self.starts_at {
            event.starts_at = starts_at;
        }
        if let Some(ends_at) = self.ends_at {
            event.ends_at = Some(ends_at);
        }
    }
}

fn validate_title(raw: &str) -> Result<String, EventValidationError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(EventValidationError::EmptyTitle);
    }
    if title.chars().count() > TITLE_MAX {
        return Err(EventValidationError::TitleTooLong { max: TITLE_MAX });
    }
    Ok(title.to_owned())
}

fn check_schedule(
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
) -> Result<(), EventValidationError> {
    match ends_at {
        Some(end) if end < starts_at => Err(EventValidationError::EndsBeforeStart),
        _ => Ok(()),
    }
}

fn trimmed_optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}
