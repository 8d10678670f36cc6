use crate::error::ClientError;
use crate::model::{Follow, FollowRequest, User};
use crate::mutation::{EntityPatch, MutationIntent, UserDelta};
use crate::store::{EntityKind, FetchMode, PageOutcome, QueryKey};

use super::ClientContext;

/// Follow relationships and follow requests.
///
/// Following a private account only records a pending request: the
/// target shows `is_follower` without `is_follower_accepted`, and no
/// counter moves until the account owner accepts.
#[derive(Clone)]
pub struct FollowService {
    ctx: ClientContext,
}

impl FollowService {
    pub fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    fn cached_user(&self, user_id: &str) -> Result<User, ClientError> {
        self.ctx
            .store
            .user(user_id)
            .ok_or_else(|| ClientError::NotCached {
                kind: EntityKind::User,
                id: user_id.to_string(),
            })
    }

    /// A no-op when the target already shows a follow, pending or not.
    pub async fn follow(&self, user_id: &str) -> Result<(), ClientError> {
        let result = self.try_follow(user_id).await;
        self.ctx.settle("Follow", result)
    }

    async fn try_follow(&self, user_id: &str) -> Result<(), ClientError> {
        let me = self.ctx.user_id()?;
        let target = self.cached_user(user_id)?;
        if target.is_follower {
            tracing::debug!(user_id, "Already following or requested");
            return Ok(());
        }

        let forward = if target.is_private {
            vec![EntityPatch::user(
                user_id,
                UserDelta {
                    is_follower: Some(true),
                    is_follower_accepted: Some(false),
                    ..Default::default()
                },
            )]
        } else {
            vec![
                EntityPatch::user(
                    user_id,
                    UserDelta {
                        is_follower: Some(true),
                        is_follower_accepted: Some(true),
                        followers: 1,
                        ..Default::default()
                    },
                ),
                EntityPatch::user(me.clone(), UserDelta::following(1)),
            ]
        };

        let request = FollowRequest {
            follower_id: me,
            target_user_id: user_id.to_string(),
        };
        let api = &self.ctx.api;
        self.ctx
            .coordinator
            .apply_optimistic(MutationIntent::new("follow", forward), async {
                api.follow(&request).await.map(|_| None)
            })
            .await?;
        Ok(())
    }

    /// Unfollow, or withdraw a pending request. Counters only move back
    /// if the follow had been accepted.
    pub async fn unfollow(&self, user_id: &str) -> Result<(), ClientError> {
        let result = self.try_unfollow(user_id).await;
        self.ctx.settle("Unfollow", result)
    }

    async fn try_unfollow(&self, user_id: &str) -> Result<(), ClientError> {
        let me = self.ctx.user_id()?;
        let target = self.cached_user(user_id)?;
        let was_accepted = target.is_follower && target.is_follower_accepted;

        let mut forward = vec![EntityPatch::user(
            user_id,
            UserDelta {
                is_follower: Some(false),
                is_follower_accepted: Some(false),
                followers: if was_accepted { -1 } else { 0 },
                ..Default::default()
            },
        )];
        if was_accepted {
            forward.push(EntityPatch::user(me.clone(), UserDelta::following(-1)));
        }

        let request = FollowRequest {
            follower_id: me,
            target_user_id: user_id.to_string(),
        };
        let api = &self.ctx.api;
        self.ctx
            .coordinator
            .apply_optimistic(MutationIntent::new("unfollow", forward), async {
                api.unfollow(&request).await.map(|_| None)
            })
            .await?;
        Ok(())
    }

    /// Accept a pending request from `follower_id`.
    pub async fn accept_request(&self, follower_id: &str) -> Result<(), ClientError> {
        let result = self.try_accept(follower_id).await;
        self.ctx
            .settle_confirmed("Accept request", "Follow request accepted", result)
    }

    async fn try_accept(&self, follower_id: &str) -> Result<(), ClientError> {
        let me = self.ctx.user_id()?;
        let request = FollowRequest {
            follower_id: follower_id.to_string(),
            target_user_id: me.clone(),
        };
        let forward = vec![EntityPatch::user(me, UserDelta::followers(1))];
        let api = &self.ctx.api;
        self.ctx
            .coordinator
            .apply_optimistic(MutationIntent::new("accept-follow", forward), async {
                api.accept_follow_request(&request).await.map(|_| None)
            })
            .await?;
        self.drop_pending(follower_id);
        Ok(())
    }

    pub async fn reject_request(&self, follower_id: &str) -> Result<(), ClientError> {
        let result = self.try_reject(follower_id).await;
        self.ctx
            .settle_confirmed("Reject request", "Follow request rejected", result)
    }

    async fn try_reject(&self, follower_id: &str) -> Result<(), ClientError> {
        let me = self.ctx.user_id()?;
        let request = FollowRequest {
            follower_id: follower_id.to_string(),
            target_user_id: me,
        };
        self.ctx.api.reject_follow_request(&request).await?;
        self.drop_pending(follower_id);
        Ok(())
    }

    fn drop_pending(&self, follower_id: &str) {
        let pending: Vec<Follow> = self.ctx.store.items(&QueryKey::PendingFollows);
        for follow in pending.iter().filter(|f| f.follower_id == follower_id) {
            self.ctx
                .store
                .remove_from_list(&QueryKey::PendingFollows, &follow.id);
        }
    }

    /// The owner of `user_id` accepted our pending request.
    ///
    /// Applies the counters a public follow would have moved right away.
    /// Ignored unless a pending request is cached.
    pub async fn apply_accepted(&self, user_id: &str) {
        let Some(target) = self.ctx.store.user(user_id) else {
            return;
        };
        if !target.is_follower || target.is_follower_accepted {
            return;
        }

        let mut patches = vec![EntityPatch::user(
            user_id,
            UserDelta {
                is_follower_accepted: Some(true),
                followers: 1,
                ..Default::default()
            },
        )];
        if let Some(me) = self.ctx.session.user_id() {
            patches.push(EntityPatch::user(me, UserDelta::following(1)));
        }
        self.ctx.coordinator.apply_confirmed(&patches).await;
        tracing::info!(user_id, "Follow request accepted");
    }

    pub async fn load_followers(&self) -> Result<PageOutcome, ClientError> {
        self.fetch(QueryKey::Followers, FetchMode::Initial).await
    }

    pub async fn load_more_followers(&self) -> Result<PageOutcome, ClientError> {
        self.fetch(QueryKey::Followers, FetchMode::Next).await
    }

    pub async fn load_following(&self) -> Result<PageOutcome, ClientError> {
        self.fetch(QueryKey::Following, FetchMode::Initial).await
    }

    pub async fn load_more_following(&self) -> Result<PageOutcome, ClientError> {
        self.fetch(QueryKey::Following, FetchMode::Next).await
    }

    pub async fn load_pending(&self) -> Result<PageOutcome, ClientError> {
        self.fetch(QueryKey::PendingFollows, FetchMode::Initial)
            .await
    }

    pub async fn load_more_pending(&self) -> Result<PageOutcome, ClientError> {
        self.fetch(QueryKey::PendingFollows, FetchMode::Next).await
    }

    async fn fetch(&self, key: QueryKey, mode: FetchMode) -> Result<PageOutcome, ClientError> {
        let api = &self.ctx.api;
        let page_size = self.ctx.paging.follows;
        match key {
            QueryKey::Followers => {
                self.ctx
                    .load_list("Loading followers", key, mode, page_size, |page, limit| {
                        api.followers(page, limit)
                    })
                    .await
            }
            QueryKey::Following => {
                self.ctx
                    .load_list("Loading following", key, mode, page_size, |page, limit| {
                        api.following(page, limit)
                    })
                    .await
            }
            _ => {
                self.ctx
                    .load_list(
                        "Loading follow requests",
                        key,
                        mode,
                        page_size,
                        |page, limit| api.pending_follow_requests(page, limit),
                    )
                    .await
            }
        }
    }

    pub fn followers(&self) -> Vec<Follow> {
        self.ctx.store.items(&QueryKey::Followers)
    }

    pub fn following(&self) -> Vec<Follow> {
        self.ctx.store.items(&QueryKey::Following)
    }

    pub fn pending(&self) -> Vec<Follow> {
        self.ctx.store.items(&QueryKey::PendingFollows)
    }
}
