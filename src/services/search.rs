use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ClientError;
use crate::model::User;
use crate::store::{FetchMode, ListState, PageOutcome, QueryKey};

use super::ClientContext;

/// User search.
///
/// Each distinct term is its own list. Starting a new term discards the
/// previous one, so a slow response for an old term never shows up under
/// the new one.
#[derive(Clone)]
pub struct SearchService {
    ctx: ClientContext,
    term: Arc<Mutex<Option<String>>>,
}

impl SearchService {
    pub fn new(ctx: ClientContext) -> Self {
        Self {
            ctx,
            term: Arc::new(Mutex::new(None)),
        }
    }

    /// Search for `query`. A blank query clears the results.
    pub async fn search(&self, query: &str) -> Result<PageOutcome, ClientError> {
        let query = query.trim();

        let previous = {
            let mut term = self.term.lock();
            if term.as_deref() == Some(query) {
                None
            } else if query.is_empty() {
                term.take()
            } else {
                term.replace(query.to_string())
            }
        };
        if let Some(previous) = previous {
            self.ctx.store.discard(&QueryKey::Search(previous));
        }

        if query.is_empty() {
            return Ok(PageOutcome::Suppressed);
        }
        self.fetch(query, FetchMode::Initial).await
    }

    pub async fn load_more(&self) -> Result<PageOutcome, ClientError> {
        let Some(term) = self.term() else {
            return Ok(PageOutcome::Suppressed);
        };
        self.fetch(&term, FetchMode::Next).await
    }

    async fn fetch(&self, term: &str, mode: FetchMode) -> Result<PageOutcome, ClientError> {
        let api = &self.ctx.api;
        let viewer = self.ctx.session.user_id();
        self.ctx
            .load_list(
                "Search",
                QueryKey::Search(term.to_string()),
                mode,
                self.ctx.paging.search,
                |page, limit| api.search_users(term, page, limit, viewer.as_deref()),
            )
            .await
    }

    /// Current search term, if any.
    pub fn term(&self) -> Option<String> {
        self.term.lock().clone()
    }

    pub fn results(&self) -> Vec<User> {
        self.term()
            .map(|term| self.ctx.store.items(&QueryKey::Search(term)))
            .unwrap_or_default()
    }

    pub fn state(&self) -> ListState {
        self.term()
            .and_then(|term| self.ctx.store.list(&QueryKey::Search(term)))
            .unwrap_or_default()
    }
}
