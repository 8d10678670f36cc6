//! The uniform response wrapper every endpoint (except auth) returns.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::ApiError;

/// `{ success, data?, message?, errors? }`
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<ErrorList>,
}

/// `errors` arrives either as a flat list or as a field → messages map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorList {
    List(Vec<String>),
    Fields(BTreeMap<String, Vec<String>>),
    Single(String),
}

impl ErrorList {
    /// Flatten into display lines; field errors become "field: a, b".
    pub fn flatten(self) -> Vec<String> {
        match self {
            ErrorList::List(errors) => errors,
            ErrorList::Fields(fields) => fields
                .into_iter()
                .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
                .collect(),
            ErrorList::Single(error) => vec![error],
        }
    }
}

impl Envelope {
    /// Whether the body looks like an envelope at all.
    pub fn is_recognizable(&self) -> bool {
        self.success.is_some() || self.message.is_some() || self.errors.is_some()
    }

    /// `data` on success, [`ApiError::Application`] on `success: false`.
    pub fn into_result(self) -> Result<Option<Value>, ApiError> {
        if self.success == Some(false) {
            return Err(self.into_error());
        }
        Ok(self.data.filter(|data| !data.is_null()))
    }

    pub fn into_error(self) -> ApiError {
        ApiError::Application {
            message: self.message,
            errors: self.errors.map(ErrorList::flatten).unwrap_or_default(),
        }
    }
}
