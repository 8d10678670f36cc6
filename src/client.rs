//! One handle over every service.

use tokio::sync::watch;

use crate::api::HttpApi;
use crate::config::Config;
use crate::error::ClientError;
use crate::notice::{NoticeReceiver, Notices};
use crate::services::{
    AuthService, ClientContext, CommentsService, FeedService, FollowService,
    NotificationService, PostService, ProfileService, SearchService,
};
use crate::session::Session;
use crate::store::Store;

/// The data layer a front end talks to.
///
/// All services share one store, one coordinator and one session, so a
/// like toggled through [`posts`](Self::posts) is visible in
/// [`feed`](Self::feed) immediately.
pub struct FeedlineClient {
    ctx: ClientContext,
    auth: AuthService,
    feed: FeedService,
    posts: PostService,
    comments: CommentsService,
    follows: FollowService,
    notifications: NotificationService,
    search: SearchService,
    profile: ProfileService,
}

impl FeedlineClient {
    /// Build a client around an existing session. Notices arrive on the
    /// returned receiver.
    pub fn new(
        config: &Config,
        session: Session,
    ) -> Result<(Self, NoticeReceiver), ClientError> {
        let api = HttpApi::new(&config.api, session.clone())?;
        let (notices, receiver) = Notices::channel();
        let ctx = ClientContext::new(api, session, notices, config.paging);

        tracing::debug!(base_url = %config.api.base_url, "Client created");
        Ok((Self::from_context(ctx), receiver))
    }

    /// Build a client whose session is hydrated from the configured token
    /// file.
    pub fn from_config(config: &Config) -> Result<(Self, NoticeReceiver), ClientError> {
        let session = Session::hydrate(config.session.resolved_token_path())?;
        Self::new(config, session)
    }

    pub fn from_context(ctx: ClientContext) -> Self {
        Self {
            auth: AuthService::new(ctx.clone()),
            feed: FeedService::new(ctx.clone()),
            posts: PostService::new(ctx.clone()),
            comments: CommentsService::new(ctx.clone()),
            follows: FollowService::new(ctx.clone()),
            notifications: NotificationService::new(ctx.clone()),
            search: SearchService::new(ctx.clone()),
            profile: ProfileService::new(ctx.clone()),
            ctx,
        }
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn feed(&self) -> &FeedService {
        &self.feed
    }

    pub fn posts(&self) -> &PostService {
        &self.posts
    }

    pub fn comments(&self) -> &CommentsService {
        &self.comments
    }

    pub fn follows(&self) -> &FollowService {
        &self.follows
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    pub fn search(&self) -> &SearchService {
        &self.search
    }

    pub fn profile(&self) -> &ProfileService {
        &self.profile
    }

    pub fn store(&self) -> &Store {
        &self.ctx.store
    }

    pub fn session(&self) -> &Session {
        &self.ctx.session
    }

    /// Revision counter that changes on every cache write.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.ctx.store.subscribe()
    }
}
