//! Remote data gateway.
//!
//! [`HttpApi`] wraps the REST endpoints. Responses use one envelope
//! (`{ success, data, message, errors }`); an envelope with
//! `success: false` is an [`ApiError::Application`], the same as a
//! transport failure for every caller.

mod comments;
mod envelope;
mod error;
mod follows;
mod http;
mod notifications;
mod posts;
mod storage;
mod users;

pub use envelope::{Envelope, ErrorList};
pub use error::ApiError;
pub use http::HttpApi;
pub use storage::Upload;
