//! Authentication primitives such as login credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use zeroize::Zeroizing;

use super::user::{Email, UserValidationError};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was missing or malformed.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

impl From<UserValidationError> for LoginValidationError {
    fn from(_: UserValidationError) -> Self {
        Self::InvalidEmail
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is normalised the same way as on registration.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use campus_events::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.org", "pw").expect("valid");
/// assert_eq!(creds.email().as_ref(), "ada@example.org");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
