//! Explicit session: tokens plus the signed-in user's id.
//!
//! A [`Session`] is created once at startup (`hydrate` reads the persisted
//! tokens) and passed to the gateway and services. `clear` is the sign-out
//! teardown and also runs when a token refresh fails.

mod token_store;

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::config::SecureString;

pub use token_store::{TokenStore, Tokens};

/// Errors from reading or writing the token file.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to read session file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write session file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed session file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default)]
struct SessionInner {
    tokens: Option<Tokens>,
    user_id: Option<String>,
}

/// Shared, cloneable session handle.
#[derive(Clone)]
pub struct Session {
    inner: Arc<RwLock<SessionInner>>,
    token_store: Option<TokenStore>,
}

impl Session {
    /// Session that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionInner::default())),
            token_store: None,
        }
    }

    /// Load persisted tokens from `path`.
    ///
    /// A corrupt token file is removed and the session starts signed out.
    pub fn hydrate(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let store = TokenStore::new(path);
        let tokens = match store.load() {
            Ok(tokens) => tokens,
            Err(err @ SessionError::Parse { .. }) => {
                tracing::warn!(error = %err, "Discarding unreadable session file");
                store.delete()?;
                None
            }
            Err(err) => return Err(err),
        };

        tracing::info!(
            path = %store.path().display(),
            authenticated = tokens.is_some(),
            "Session hydrated"
        );

        Ok(Self {
            inner: Arc::new(RwLock::new(SessionInner {
                tokens,
                user_id: None,
            })),
            token_store: Some(store),
        })
    }

    pub fn access_token(&self) -> Option<SecureString> {
        self.inner
            .read()
            .tokens
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<SecureString> {
        self.inner
            .read()
            .tokens
            .as_ref()
            .map(|t| t.refresh_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .tokens
            .as_ref()
            .is_some_and(|t| !t.access_token.is_empty())
    }

    /// Replace the token pair and persist it.
    pub fn set_tokens(
        &self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<(), SessionError> {
        let tokens = Tokens {
            access_token: SecureString::new(access_token),
            refresh_token: SecureString::new(refresh_token),
        };
        if let Some(store) = &self.token_store {
            store.save(&tokens)?;
        }
        self.inner.write().tokens = Some(tokens);
        Ok(())
    }

    pub fn set_user(&self, user_id: impl Into<String>) {
        self.inner.write().user_id = Some(user_id.into());
    }

    pub fn user_id(&self) -> Option<String> {
        self.inner.read().user_id.clone()
    }

    /// Forget tokens and user, and remove the token file.
    pub fn clear(&self) {
        {
            let mut inner = self.inner.write();
            inner.tokens = None;
            inner.user_id = None;
        }
        if let Some(store) = &self.token_store {
            if let Err(err) = store.delete() {
                tracing::warn!(error = %err, "Failed to remove session file");
            }
        }
        tracing::info!("Session cleared");
    }
}
