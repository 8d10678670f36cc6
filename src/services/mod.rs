//! Service boundary.
//!
//! Each service method is one user action or query. It validates input,
//! drives the store and the coordinator, and reports the outcome: the
//! `Result` goes back to the caller and a matching [`Notice`] goes out on
//! the notice channel (errors always, successes where the action warrants
//! a confirmation).
//!
//! [`Notice`]: crate::notice::Notice

mod auth;
mod comments;
mod feed;
mod follow;
mod notifications;
mod posts;
mod profile;
mod search;

use std::future::Future;
use std::sync::Arc;

use crate::api::{ApiError, HttpApi};
use crate::config::PagingConfig;
use crate::error::ClientError;
use crate::mutation::Coordinator;
use crate::notice::Notices;
use crate::session::Session;
use crate::store::{load_page, FetchMode, IntoPage, PageOutcome, QueryKey, Store};

pub use auth::AuthService;
pub use comments::CommentsService;
pub use feed::FeedService;
pub use follow::FollowService;
pub use notifications::NotificationService;
pub use posts::PostService;
pub use profile::ProfileService;
pub use search::SearchService;

/// Shared handles every service works through.
#[derive(Clone)]
pub struct ClientContext {
    pub api: Arc<HttpApi>,
    pub store: Store,
    pub coordinator: Coordinator,
    pub notices: Notices,
    pub session: Session,
    pub paging: PagingConfig,
}

impl ClientContext {
    pub fn new(api: HttpApi, session: Session, notices: Notices, paging: PagingConfig) -> Self {
        let store = Store::new();
        Self {
            api: Arc::new(api),
            coordinator: Coordinator::new(store.clone()),
            store,
            notices,
            session,
            paging,
        }
    }

    /// The signed-in user's id.
    pub(crate) fn user_id(&self) -> Result<String, ClientError> {
        self.session.user_id().ok_or(ClientError::NotSignedIn)
    }

    /// Emit one error notice for a failed action and hand the result back.
    pub(crate) fn settle<T>(
        &self,
        action: &str,
        result: Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        if let Err(err) = &result {
            tracing::debug!(action, error = %err, "Action failed");
            self.notices.error(format!("{} failed", action), err.detail());
        }
        result
    }

    /// Like [`settle`](Self::settle), plus a success notice.
    pub(crate) fn settle_confirmed<T>(
        &self,
        action: &str,
        success: &str,
        result: Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        let result = self.settle(action, result);
        if result.is_ok() {
            self.notices.success(success);
        }
        result
    }

    /// One page fetch for `key`, reported at the service boundary.
    pub(crate) async fn load_list<P, F, Fut>(
        &self,
        action: &str,
        key: QueryKey,
        mode: FetchMode,
        page_size: u32,
        fetch: F,
    ) -> Result<PageOutcome, ClientError>
    where
        P: IntoPage,
        F: FnOnce(u32, u32) -> Fut,
        Fut: Future<Output = Result<P, ApiError>>,
    {
        let result = load_page(&self.store, key, mode, page_size, fetch)
            .await
            .map_err(ClientError::from);
        self.settle(action, result)
    }

    /// Reload page 1 after a confirmed mutation. A failure here is logged
    /// and recorded on the list, but does not fail the mutation.
    pub(crate) async fn refetch<P, F, Fut>(&self, key: QueryKey, page_size: u32, fetch: F)
    where
        P: IntoPage,
        F: FnOnce(u32, u32) -> Fut,
        Fut: Future<Output = Result<P, ApiError>>,
    {
        let result = load_page(&self.store, key.clone(), FetchMode::Initial, page_size, fetch);
        if let Err(err) = result.await {
            tracing::warn!(key = %key, error = %err, "Refetch after mutation failed");
        }
    }
}
