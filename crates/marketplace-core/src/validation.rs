//! Client-side validation of the signup form.
//!
//! Invalid forms are reported field by field and never sent to the server.

use thiserror::Error;

/// Django's username length limit
const MAX_USERNAME_LENGTH: usize = 150;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Signup form has {} invalid field(s)", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// First message for a field, if any
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        let mut push = |field: &'static str, message: &str| {
            errors.push(FieldError {
                field,
                message: message.to_string(),
            })
        };

        let username = self.username.trim();
        if username.is_empty() {
            push("username", "Username is required.");
        } else if username.chars().count() > MAX_USERNAME_LENGTH {
            push("username", "Username must be 150 characters or fewer.");
        } else if !username.chars().all(is_username_char) {
            push("username", "Username may only contain letters, digits and @/./+/-/_.");
        }

        let email = self.email.trim();
        if email.is_empty() {
            push("email", "Email is required.");
        } else if !is_plausible_email(email) {
            push("email", "Enter a valid email address.");
        }

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            push("password", "Password must be at least 8 characters.");
        } else if self.password.chars().all(|c| c.is_ascii_digit()) {
            push("password", "Password cannot be entirely numeric.");
        }

        if self.password != self.password_confirmation {
            push("password_confirmation", "Passwords do not match.");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { errors })
        }
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
