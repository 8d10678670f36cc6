//! Errors returned from the service boundary.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::SessionError;
use crate::store::EntityKind;
use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport, status or application failure from the REST API
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Input rejected before any optimistic patch or network call
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("{kind:?} '{id}' is not loaded")]
    NotCached { kind: EntityKind, id: String },

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api(err) if err.is_unauthorized())
    }

    /// Text for the `detail` line of an error notice.
    pub fn detail(&self) -> String {
        match self {
            ClientError::Api(err) if !err.details().is_empty() => {
                format!("{}\n{}", err, err.details().join("\n"))
            }
            ClientError::Validation(errors) => errors.messages().join("\n"),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_lists_field_errors() {
        let err = ClientError::from(ApiError::Application {
            message: Some("Validation failed".into()),
            errors: vec!["Content: required".into()],
        });
        assert_eq!(err.detail(), "Validation failed\nContent: required");
    }

    #[test]
    fn test_unauthorized_passthrough() {
        assert!(ClientError::from(ApiError::Unauthorized).is_unauthorized());
        assert!(!ClientError::NotSignedIn.is_unauthorized());
    }
}
