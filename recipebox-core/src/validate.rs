//! Local validation of the login and registration forms.
//!
//! Checks run before any request is made; a failing form never reaches the
//! backend.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Shortest password the backend accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("All fields are required.")]
    MissingFields,

    #[error("Enter a valid email address.")]
    InvalidEmail,

    #[error("Password must be at least 6 characters.")]
    PasswordTooShort,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Email and password are required")]
    MissingCredentials,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"))
}

/// Loose shape check: something, `@`, something, `.`, something.
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Login needs both fields; nothing else is checked locally.
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

/// Contents of the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Checks run in order and the first failure is reported.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.is_empty() || self.password.is_empty() || self.confirm_password.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("cook@example.com"));
        assert!(is_valid_email("a@b.c"));
        assert!(!is_valid_email("cook@example"));
        assert!(!is_valid_email("cook.example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_validate_login() {
        assert_eq!(validate_login("", "x"), Err(ValidationError::MissingCredentials));
        assert_eq!(validate_login("a@b.co", ""), Err(ValidationError::MissingCredentials));
        assert!(validate_login("a@b.co", "x").is_ok());
    }

    #[test]
    fn test_registration_checks_in_order() {
        let form = RegistrationForm::new("bad", "123", "");
        assert_eq!(form.validate(), Err(ValidationError::MissingFields));

        let form = RegistrationForm::new("bad", "123", "456");
        assert_eq!(form.validate(), Err(ValidationError::InvalidEmail));

        let form = RegistrationForm::new("cook@example.com", "123", "456");
        assert_eq!(form.validate(), Err(ValidationError::PasswordTooShort));

        let form = RegistrationForm::new("cook@example.com", "secret1", "secret2");
        assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));

        let form = RegistrationForm::new("cook@example.com", "secret1", "secret1");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::PasswordTooShort.to_string(),
            "Password must be at least 6 characters."
        );
        assert_eq!(
            ValidationError::MissingCredentials.to_string(),
            "Email and password are required"
        );
    }
}
