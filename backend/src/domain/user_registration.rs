//! Registration payload validation.
//!
//! [`RegistrationRequest`] mirrors what a client submits. [`validate`]
//! applies the stateless checks in a fixed order so callers always see the
//! first failing rule; uniqueness checks need the repository and happen in
//! the account service afterwards.
//!
//! [`validate`]: RegistrationRequest::validate

use std::fmt;

use chrono::NaiveDate;
use zeroize::Zeroizing;

use super::user::{Email, StudentCode, UserValidationError, parse_date_of_birth};

/// Affiliation fields mandatory for non-external users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffiliationField {
    SemesterOfEntry,
    StudentCode,
    Course,
}

impl fmt::Display for AffiliationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SemesterOfEntry => "semester of entry",
            Self::StudentCode => "student code",
            Self::Course => "course",
        })
    }
}

/// Stateless registration failures, ordered as they are checked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("{0} is required for non-external users")]
    AffiliationRequired(AffiliationField),
    #[error(transparent)]
    Invalid(#[from] UserValidationError),
}

/// Raw registration input.
///
/// Blank strings count as absent, matching how clients tend to submit empty
/// form fields.
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<Zeroizing<String>>,
    pub password_confirmation: Option<Zeroizing<String>>,
    pub profile_pic_url: Option<String>,
    pub is_external: bool,
    pub student_code: Option<String>,
    pub course: Option<String>,
    pub semester_of_entry: Option<String>,
    pub date_of_birth: Option<String>,
}

/// Registration that passed every stateless rule.
#[derive(Debug, Clone)]
pub struct ValidatedRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password: Zeroizing<String>,
    pub is_external: bool,
    pub profile_pic_url: Option<String>,
    pub student_code: Option<StudentCode>,
    pub course: Option<String>,
    pub semester_of_entry: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl RegistrationRequest {
    /// Run the stateless checks.
    ///
    /// # Examples
    /// ```
    /// use campus_events::domain::{RegistrationError, RegistrationRequest};
    /// use zeroize::Zeroizing;
    ///
    /// let request = RegistrationRequest {
    ///     first_name: Some("Ada".into()),
    ///     last_name: Some("Lovelace".into()),
    ///     email: Some("ada@example.org".into()),
    ///     password: Some(Zeroizing::new("a".into())),
    ///     password_confirmation: Some(Zeroizing::new("b".into())),
    ///     is_external: true,
    ///     ..RegistrationRequest::default()
    /// };
    /// assert_eq!(request.validate().unwrap_err(), RegistrationError::PasswordMismatch);
    /// ```
    pub fn validate(self) -> Result<ValidatedRegistration, RegistrationError> {
        let first_name = required(self.first_name, "firstName")?;
        let last_name = required(self.last_name, "lastName")?;
        let raw_email = required(self.email, "email")?;
        let password = required_secret(self.password, "password")?;
        let confirmation = required_secret(self.password_confirmation, "passwordConfirmation")?;

        if *password != *confirmation {
            return Err(RegistrationError::PasswordMismatch);
        }

        let semester_of_entry = present(self.semester_of_entry);
        let student_code = present(self.student_code);
        let course = present(self.course);

        if !self.is_external {
            let missing = [
                (semester_of_entry.is_none(), AffiliationField::SemesterOfEntry),
                (student_code.is_none(), AffiliationField::StudentCode),
                (course.is_none(), AffiliationField::Course),
            ]
            .into_iter()
            .find_map(|(absent, field)| absent.then_some(field));
            if let Some(field) = missing {
                return Err(RegistrationError::AffiliationRequired(field));
            }
        }

        let email = Email::new(raw_email)?;
        let student_code = student_code.map(StudentCode::new).transpose()?;
        let date_of_birth = present(self.date_of_birth)
            .map(|raw| parse_date_of_birth(&raw))
            .transpose()?;

        Ok(ValidatedRegistration {
            first_name,
            last_name,
            email,
            password,
            is_external: self.is_external,
            profile_pic_url: present(self.profile_pic_url),
            student_code,
            course,
            semester_of_entry,
            date_of_birth,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, RegistrationError> {
    present(value).ok_or(RegistrationError::MissingField(field))
}

fn required_secret(
    value: Option<Zeroizing<String>>,
    field: &'static str,
) -> Result<Zeroizing<String>, RegistrationError> {
    value
        .filter(|secret| !secret.is_empty())
        .ok_or(RegistrationError::MissingField(field))
}
