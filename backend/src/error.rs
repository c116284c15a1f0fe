//! Facade error type.
//!
//! ERROR HANDLING
//! ==============
//! Every remote failure collapses into a [`BackendError`] whose `Display`
//! text is the human message the session layer stores in its `error` field.
//! There is no retry classification: callers see one failure per call.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Errors produced by backend-access calls.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// A required configuration variable is absent or blank.
    #[error("missing configuration: {var} is not set")]
    MissingConfig { var: &'static str },

    /// A configuration value is present but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// A success response body did not match the expected shape.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The call needs a signed-in session and none is stored.
    #[error("no active session")]
    NoSession,

    /// The realtime websocket could not be opened or the channel join was refused.
    #[error("realtime channel failed: {0}")]
    Realtime(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Parse(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}

impl BackendError {
    /// HTTP status of an API error, if this is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Reduce an error body from the auth or REST service to its human message.
///
/// The auth service uses `error_description` / `msg` / `error`, the REST
/// service uses `message`. Anything unrecognized falls back to the raw body,
/// and an empty body to the status code.
pub(crate) fn api_error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                if !text.trim().is_empty() {
                    return text.to_owned();
                }
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("request failed with status {status}")
    } else {
        trimmed.to_owned()
    }
}
