use thiserror::Error;

use crate::validation::ValidationErrors;

/// Shown when the server gives no usable message
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not signed in")]
    SessionMissing,

    #[error("Session expired - please sign in again")]
    SessionExpired,

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Token storage error: {0:#}")]
    Storage(#[from] anyhow::Error),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status {
            400 => ApiError::BadRequest(truncated),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True when the caller has to send the user back to the login screen
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ApiError::SessionMissing | ApiError::SessionExpired | ApiError::Unauthorized
        )
    }

    /// Message suitable for showing to the user.
    ///
    /// Prefers the message the server put in the response body, falling
    /// back to a generic string.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::SessionMissing | ApiError::SessionExpired | ApiError::Unauthorized => {
                "Please sign in to continue.".to_string()
            }
            ApiError::RateLimited => self.to_string(),
            ApiError::AccessDenied(body)
            | ApiError::NotFound(body)
            | ApiError::BadRequest(body)
            | ApiError::ServerError(body) => server_message(body)
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
            ApiError::Validation(errors) => errors
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("\n"),
            ApiError::InvalidResponse(_)
            | ApiError::InvalidRequest(_)
            | ApiError::Network(_)
            | ApiError::Storage(_) => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Extract a human-readable message from a JSON error body.
///
/// Looks at `detail`, `error`, `message` and `non_field_errors` first,
/// then the first field error of a validation response.
pub fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    for key in ["detail", "error", "message", "non_field_errors"] {
        if let Some(message) = object.get(key).and_then(first_text) {
            return Some(message);
        }
    }

    object.iter().find_map(|(field, value)| {
        first_text(value).map(|message| format!("{}: {}", field, message))
    })
}

fn first_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}
