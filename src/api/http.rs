//! HTTP transport for the REST API.
//!
//! Every request carries the session's bearer token. A 401 triggers one
//! token refresh followed by one retry; when that does not help, the
//! session is cleared and the call fails with [`ApiError::Unauthorized`].
//! Refreshes are serialized: requests rejected with the same token share
//! one refresh call.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::{bearer_header, ApiConfig, SecureString};
use crate::model::{AuthResponse, RefreshRequest};
use crate::session::Session;

use super::envelope::Envelope;
use super::ApiError;

const REFRESH_PATH: &str = "/api/User/refresh-token";

/// Longest slice of a non-JSON error body kept in [`ApiError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// Query string pairs, appended in order.
pub(crate) type Query<'a> = &'a [(&'a str, String)];

/// Typed client for the REST API.
pub struct HttpApi {
    client: Client,
    base_url: String,
    session: Session,
    refresh_lock: Mutex<()>,
}

impl HttpApi {
    pub fn new(config: &ApiConfig, session: Session) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds as u64))
            .timeout(Duration::from_secs(config.timeout_seconds as u64))
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: Query<'_>) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ApiError::InvalidRequest(format!("Bad URL for '{}': {}", path, e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// `data` of a successful envelope, required to be present.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        match self.submit(method, path, query, body).await? {
            Some(data) => Ok(data),
            None => Err(ApiError::MissingData {
                path: path.to_string(),
            }),
        }
    }

    /// `data` of a successful envelope, if the server sent any.
    pub(crate) async fn submit<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<Value>,
    ) -> Result<Option<T>, ApiError> {
        let data = self
            .dispatch(method, path, query, |builder| match &body {
                Some(body) => Ok(builder.json(body)),
                None => Ok(builder),
            })
            .await?;
        data.map(|data| decode(path, data)).transpose()
    }

    /// Send a request and unwrap the envelope.
    ///
    /// `attach` adds the body; it runs once per attempt so that
    /// non-cloneable bodies (multipart forms) survive the retry.
    pub(crate) async fn dispatch<F>(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        attach: F,
    ) -> Result<Option<Value>, ApiError>
    where
        F: Fn(RequestBuilder) -> Result<RequestBuilder, ApiError>,
    {
        let url = self.url(path, query)?;
        let token = self.session.access_token();
        let mut response = self
            .attempt(&method, &url, path, token.as_ref(), &attach)
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!(path, "Access token rejected, refreshing");
            if !self.refresh(token.as_ref()).await {
                return Err(ApiError::Unauthorized);
            }
            let token = self.session.access_token();
            response = self
                .attempt(&method, &url, path, token.as_ref(), &attach)
                .await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                tracing::warn!(path, "Request still unauthorized after refresh");
                self.session.clear();
                return Err(ApiError::Unauthorized);
            }
        }

        read_envelope(path, response).await
    }

    async fn attempt<F>(
        &self,
        method: &Method,
        url: &Url,
        path: &str,
        token: Option<&SecureString>,
        attach: &F,
    ) -> Result<Response, ApiError>
    where
        F: Fn(RequestBuilder) -> Result<RequestBuilder, ApiError>,
    {
        let mut builder = self.client.request(method.clone(), url.clone());
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, bearer_header(token));
        }
        let builder = attach(builder)?;

        tracing::debug!(method = %method, path, "Sending request");
        builder.send().await.map_err(|e| ApiError::Transport {
            path: path.to_string(),
            source: e,
        })
    }

    /// Exchange the refresh token for a new pair after `rejected` failed.
    ///
    /// Returns true without a network call when another request already
    /// replaced the rejected token. On false the session has been cleared.
    async fn refresh(&self, rejected: Option<&SecureString>) -> bool {
        let _guard = self.refresh_lock.lock().await;

        let current = self.session.access_token();
        if current.is_some() && current.as_ref() != rejected {
            tracing::debug!("Access token already refreshed");
            return true;
        }

        let refreshed = self.exchange_tokens().await;
        if !refreshed {
            self.session.clear();
        }
        refreshed
    }

    async fn exchange_tokens(&self) -> bool {
        let (Some(access_token), Some(refresh_token)) =
            (self.session.access_token(), self.session.refresh_token())
        else {
            return false;
        };

        let request = RefreshRequest {
            access_token: access_token.expose().to_string(),
            refresh_token: refresh_token.expose().to_string(),
        };
        let auth = match self.post_auth(REFRESH_PATH, &request).await {
            Ok(auth) => auth,
            Err(err) => {
                tracing::warn!(error = %err, "Token refresh failed");
                return false;
            }
        };

        match (auth.access_token, auth.refresh_token) {
            (Some(access), Some(refresh)) if auth.is_success => {
                if let Err(err) = self.session.set_tokens(access, refresh) {
                    tracing::warn!(error = %err, "Failed to persist refreshed tokens");
                }
                tracing::info!("Access token refreshed");
                true
            }
            _ => {
                tracing::warn!("Token refresh rejected");
                false
            }
        }
    }

    /// Auth endpoints answer with a bare [`AuthResponse`] instead of an
    /// envelope.
    pub(crate) async fn post_auth<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.url(path, &[])?;
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                path: path.to_string(),
                source: e,
            })?;

        let status = response.status();
        let bytes = read_body(path, response).await?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
                path: path.to_string(),
                source: e,
            });
        }
        if status == StatusCode::UNAUTHORIZED && path == REFRESH_PATH {
            return Err(ApiError::Unauthorized);
        }
        Err(error_from_body(status, &bytes))
    }
}

/// Serialize a payload for a JSON body.
pub(crate) fn json_body<B: Serialize>(payload: &B) -> Result<Value, ApiError> {
    serde_json::to_value(payload)
        .map_err(|e| ApiError::InvalidRequest(format!("Unserializable payload: {}", e)))
}

fn decode<T: DeserializeOwned>(path: &str, data: Value) -> Result<T, ApiError> {
    serde_json::from_value(data).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        source: e,
    })
}

async fn read_body(path: &str, response: Response) -> Result<Vec<u8>, ApiError> {
    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|e| ApiError::Transport {
            path: path.to_string(),
            source: e,
        })
}

async fn read_envelope(path: &str, response: Response) -> Result<Option<Value>, ApiError> {
    let status = response.status();
    let bytes = read_body(path, response).await?;

    if !status.is_success() {
        return Err(error_from_body(status, &bytes));
    }
    if bytes.is_empty() {
        return Ok(None);
    }

    let envelope: Envelope = serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        source: e,
    })?;
    envelope.into_result()
}

/// Prefer the envelope's own message; fall back to the raw body.
fn error_from_body(status: StatusCode, bytes: &[u8]) -> ApiError {
    if let Ok(envelope) = serde_json::from_slice::<Envelope>(bytes) {
        if envelope.is_recognizable() {
            return envelope.into_error();
        }
    }

    let text = String::from_utf8_lossy(bytes);
    let message = match text.trim() {
        "" => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
        body => body.chars().take(MAX_ERROR_BODY).collect(),
    };
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}
