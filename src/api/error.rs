//! Gateway error classification.

use thiserror::Error;

/// Errors returned by [`HttpApi`](super::HttpApi) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure or timeout before a response arrived
    #[error("Request to '{path}' failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response without a readable envelope
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Envelope with `success: false`
    #[error("{}", summarize(.message, .errors))]
    Application {
        message: Option<String>,
        errors: Vec<String>,
    },

    /// Credentials rejected and the refresh flow could not recover
    #[error("Session expired, please sign in again")]
    Unauthorized,

    /// Body did not match the expected shape
    #[error("Failed to decode response from '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Successful envelope without the `data` the call needs
    #[error("Response from '{path}' carried no data")]
    MissingData { path: String },

    /// Request could not be built (bad URL, bad MIME type, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Short machine-readable classification, used in logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Transport { .. } => "transport_error",
            ApiError::Status { .. } => "status_error",
            ApiError::Application { .. } => "application_error",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Decode { .. } => "decode_error",
            ApiError::MissingData { .. } => "missing_data",
            ApiError::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Per-field messages carried by an application failure.
    pub fn details(&self) -> &[String] {
        match self {
            ApiError::Application { errors, .. } => errors,
            _ => &[],
        }
    }
}

fn summarize(message: &Option<String>, errors: &[String]) -> String {
    match message.as_deref().map(str::trim) {
        Some(message) if !message.is_empty() => message.to_string(),
        _ if !errors.is_empty() => errors.join("; "),
        _ => "Request failed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_message_preferred() {
        let err = ApiError::Application {
            message: Some("Post not found".into()),
            errors: vec!["id: unknown".into()],
        };
        assert_eq!(err.to_string(), "Post not found");
        assert_eq!(err.details(), ["id: unknown".to_string()]);
    }

    #[test]
    fn test_application_falls_back_to_errors() {
        let err = ApiError::Application {
            message: None,
            errors: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "a; b");

        let bare = ApiError::Application {
            message: Some("  ".into()),
            errors: vec![],
        };
        assert_eq!(bare.to_string(), "Request failed");
    }
}
