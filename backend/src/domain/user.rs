//! User data model.
//!
//! Identity and contact fields are wrapped in validating newtypes so that
//! repositories and handlers never see an unchecked email or student code.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum accepted length of a student code.
pub const STUDENT_CODE_MAX: usize = 32;

/// Validation errors raised while building user values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("email must be a valid address")]
    InvalidEmail,
    #[error("student code must be 1 to {max} letters or digits")]
    InvalidStudentCode { max: usize },
    #[error("date of birth must be a date (YYYY-MM-DD) or an RFC 3339 timestamp")]
    InvalidDateOfBirth,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from its hyphenated form.
    ///
    /// # Examples
    /// ```
    /// use campus_events::domain::UserId;
    ///
    /// assert!(UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").is_ok());
    /// assert!(UserId::new("nope").is_err());
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalised email address.
///
/// ## Invariants
/// - Trimmed and lower-cased.
/// - Exactly one `@` with a non-empty local part and a domain containing no
///   whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use campus_events::domain::Email;
    ///
    /// let email = Email::new("  Ada@Example.org ").expect("valid email");
    /// assert_eq!(email.as_ref(), "ada@example.org");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        let mut parts = normalised.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty() || domain.is_empty() || normalised.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Institutional student code. Unique across users.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StudentCode(String);

impl StudentCode {
    /// Validate a student code: trimmed, ASCII letters or digits only.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        let valid = !trimmed.is_empty()
            && trimmed.len() <= STUDENT_CODE_MAX
            && trimmed.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(UserValidationError::InvalidStudentCode {
                max: STUDENT_CODE_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for StudentCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for StudentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encoded password hash (PHC string). Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap an already encoded hash.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded PHC string suitable for storage.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// Parse a date of birth supplied either as a calendar date or as a full
/// RFC 3339 timestamp. Timestamps keep only their date component.
///
/// # Examples
/// ```
/// use campus_events::domain::parse_date_of_birth;
///
/// let a = parse_date_of_birth("2001-04-09").expect("date");
/// let b = parse_date_of_birth("2001-04-09T00:00:00Z").expect("timestamp");
/// assert_eq!(a, b);
/// ```
pub fn parse_date_of_birth(raw: &str) -> Result<NaiveDate, UserValidationError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|ts| ts.date_naive()))
        .map_err(|_| UserValidationError::InvalidDateOfBirth)
}

/// Application user as persisted by the user repository.
///
/// ## Invariants
/// - `student_code`, `course`, and `semester_of_entry` are present whenever
///   `is_external` is false.
/// - `email` and `student_code` are unique across users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password_digest: PasswordDigest,
    pub is_external: bool,
    pub profile_pic_url: Option<String>,
    pub student_code: Option<StudentCode>,
    pub course: Option<String>,
    pub semester_of_entry: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Allow-listed changes accepted by the edit-user operation.
///
/// Identity, credentials, and affiliation status are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_pic_url: Option<String>,
    pub course: Option<String>,
    pub semester_of_entry: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl UserPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Trim text fields and reject blanks.
    pub fn normalised(self) -> Result<Self, UserValidationError> {
        Ok(Self {
            first_name: non_blank(self.first_name, "first name")?,
            last_name: non_blank(self.last_name, "last name")?,
            profile_pic_url: self.profile_pic_url.map(|url| url.trim().to_owned()),
            course: non_blank(self.course, "course")?,
            semester_of_entry: non_blank(self.semester_of_entry, "semester of entry")?,
            date_of_birth: self.date_of_birth,
        })
    }

    /// Apply the patch to an in-memory record.
    pub fn apply(&self, user: &mut User) {
        if let Some(first_name) = &self.first_name {
            user.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &self.last_name {
            user.last_name.clone_from(last_name);
        }
        if let Some(url) = &self.profile_pic_url {
            user.profile_pic_url = Some(url.clone());
        }
        if let Some(course) = &self.course {
            user.course = Some(course.clone());
        }
        if let Some(semester) = &self.semester_of_entry {
            user.semester_of_entry = Some(semester.clone());
        }
        if let Some(date) = self.date_of_birth {
            user.date_of_birth = Some(date);
        }
    }
}

fn non_blank(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<String>, UserValidationError> {
    match value {
        Some(raw) if raw.trim().is_empty() => Err(UserValidationError::EmptyField { field }),
        Some(raw) => Ok(Some(raw.trim().to_owned())),
        None => Ok(None),
    }
}
