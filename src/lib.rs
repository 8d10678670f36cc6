//! Client data layer for a social feed.
//!
//! The crate keeps a normalized in-memory cache of everything the views
//! render (posts, users, comments, notifications, follow records), merges
//! server pages into ordered lists, and applies optimistic mutations that
//! are confirmed or rolled back once the REST call settles.
//!
//! ```text
//! service call ──→ Coordinator ──→ Store (patch) ──→ watchers re-render
//!                      │
//!                      └──→ HttpApi ──→ settle: keep / replace / roll back
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod media;
pub mod model;
pub mod mutation;
pub mod notice;
pub mod services;
pub mod session;
pub mod store;
pub mod validation;

pub use client::FeedlineClient;
pub use error::ClientError;
