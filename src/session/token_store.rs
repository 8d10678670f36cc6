//! On-disk persistence for session tokens.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::SecureString;

use super::SessionError;

/// Access and refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tokens {
    pub access_token: SecureString,
    pub refresh_token: SecureString,
}

/// JSON file holding the persisted [`Tokens`].
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted tokens. A missing file is not an error.
    pub fn load(&self) -> Result<Option<Tokens>, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(SessionError::Read {
                    path: self.path.clone(),
                    source: err,
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| SessionError::Parse {
                path: self.path.clone(),
                source: e,
            })
    }

    pub fn save(&self, tokens: &Tokens) -> Result<(), SessionError> {
        let write_err = |source| SessionError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = serde_json::to_string_pretty(tokens).map_err(|e| SessionError::Parse {
            path: self.path.clone(),
            source: e,
        })?;
        fs::write(&self.path, content).map_err(write_err)
    }

    pub fn delete(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SessionError::Write {
                path: self.path.clone(),
                source: err,
            }),
        }
    }
}
