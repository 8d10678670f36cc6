use crate::error::ClientError;
use crate::model::Post;
use crate::store::{FetchMode, ListState, PageOutcome, QueryKey};

use super::ClientContext;

/// The home feed.
#[derive(Clone)]
pub struct FeedService {
    ctx: ClientContext,
}

impl FeedService {
    pub fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    /// Load page 1, replacing whatever the feed held.
    pub async fn load(&self) -> Result<PageOutcome, ClientError> {
        self.fetch(FetchMode::Initial).await
    }

    /// Append the next page. Suppressed while a fetch is running or after
    /// the last page.
    pub async fn load_more(&self) -> Result<PageOutcome, ClientError> {
        self.fetch(FetchMode::Next).await
    }

    pub async fn refresh(&self) -> Result<PageOutcome, ClientError> {
        self.fetch(FetchMode::Initial).await
    }

    async fn fetch(&self, mode: FetchMode) -> Result<PageOutcome, ClientError> {
        let api = &self.ctx.api;
        self.ctx
            .load_list(
                "Loading feed",
                QueryKey::Feed,
                mode,
                self.ctx.paging.feed,
                |page, limit| api.feed(page, limit),
            )
            .await
    }

    pub fn posts(&self) -> Vec<Post> {
        self.ctx.store.items(&QueryKey::Feed)
    }

    pub fn state(&self) -> ListState {
        self.ctx.store.list(&QueryKey::Feed).unwrap_or_default()
    }

    /// Put a post at the top of the feed unless it is already there.
    pub fn add_local(&self, post: Post) {
        self.ctx.store.prepend(&QueryKey::Feed, post);
    }

    /// Take a post out of the feed without deleting it.
    pub fn remove_local(&self, post_id: &str) {
        self.ctx.store.remove_from_list(&QueryKey::Feed, post_id);
    }
}
