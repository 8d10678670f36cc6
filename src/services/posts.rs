use crate::error::ClientError;
use crate::model::{NewPost, Post, PostUpdate, SharePost, Visibility};
use crate::mutation::{EntityPatch, MutationIntent, PostDelta, UserDelta};
use crate::store::{EntityKind, QueryKey};
use crate::validation;

use super::ClientContext;

/// Single-post actions: detail, like, share, create, edit, delete.
#[derive(Clone)]
pub struct PostService {
    ctx: ClientContext,
}

impl PostService {
    pub fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    pub async fn load(&self, post_id: &str) -> Result<Post, ClientError> {
        let result = self.ctx.api.get_post(post_id).await.map_err(ClientError::from);
        if let Ok(post) = &result {
            self.ctx.store.upsert(post.clone());
        }
        self.ctx.settle("Loading post", result)
    }

    /// Flip the like state optimistically and return the new state.
    ///
    /// The flip is taken against the post as it stands once earlier
    /// mutations of it have settled. Every view of the post shows the new
    /// state at once; a failed call puts the previous state back.
    pub async fn toggle_like(&self, post_id: &str) -> Result<bool, ClientError> {
        let result = self.try_toggle_like(post_id).await;
        self.ctx.settle("Like", result)
    }

    async fn try_toggle_like(&self, post_id: &str) -> Result<bool, ClientError> {
        let not_cached = || ClientError::NotCached {
            kind: EntityKind::Post,
            id: post_id.to_string(),
        };
        if self.ctx.store.post(post_id).is_none() {
            return Err(not_cached());
        }

        let intent = MutationIntent::new(
            "like",
            vec![EntityPatch::post(post_id, PostDelta::toggle_like())],
        );
        let api = &self.ctx.api;
        self.ctx
            .coordinator
            .apply_optimistic(intent, async move {
                api.toggle_like(post_id).await.map(|_| None)
            })
            .await?;

        self.ctx
            .store
            .post(post_id)
            .map(|post| post.is_liked)
            .ok_or_else(not_cached)
    }

    /// Share a post. The new post goes to the top of the feed and of the
    /// user's own posts.
    pub async fn share(
        &self,
        post_id: &str,
        visibility: Visibility,
    ) -> Result<Option<Post>, ClientError> {
        let result = self.try_share(post_id, visibility).await;
        self.ctx.settle_confirmed("Share", "Post shared", result)
    }

    async fn try_share(
        &self,
        post_id: &str,
        visibility: Visibility,
    ) -> Result<Option<Post>, ClientError> {
        let request = SharePost {
            parent_post_id: post_id.to_string(),
            visibility,
        };
        let shared = self.ctx.api.share_post(&request).await?;

        let mut patches = vec![EntityPatch::post(post_id, PostDelta::shares(1))];
        if let Some(user_id) = self.ctx.session.user_id() {
            patches.push(EntityPatch::user(
                user_id,
                UserDelta {
                    posts: 1,
                    ..Default::default()
                },
            ));
        }
        self.ctx.coordinator.apply_confirmed(&patches).await;

        if let Some(post) = &shared {
            self.publish(post.clone());
        }
        Ok(shared)
    }

    pub async fn create(&self, post: &NewPost) -> Result<Option<Post>, ClientError> {
        let result = self.try_create(post).await;
        self.ctx.settle_confirmed("Create post", "Post published", result)
    }

    async fn try_create(&self, post: &NewPost) -> Result<Option<Post>, ClientError> {
        validation::new_post(post)?;
        let created = self.ctx.api.create_post(post).await?;

        if let Some(user_id) = self.ctx.session.user_id() {
            let patch = EntityPatch::user(
                user_id,
                UserDelta {
                    posts: 1,
                    ..Default::default()
                },
            );
            self.ctx.coordinator.apply_confirmed(&[patch]).await;
        }
        if let Some(created) = &created {
            self.publish(created.clone());
        }
        Ok(created)
    }

    /// Edit a post; the server's copy replaces the cached one.
    pub async fn update(&self, update: &PostUpdate) -> Result<Option<Post>, ClientError> {
        let result = self.try_update(update).await;
        self.ctx.settle_confirmed("Update post", "Post updated", result)
    }

    async fn try_update(&self, update: &PostUpdate) -> Result<Option<Post>, ClientError> {
        let updated = self.ctx.api.update_post(update).await?;
        if let Some(post) = &updated {
            self.ctx.store.upsert(post.clone());
        }
        Ok(updated)
    }

    /// Delete a post and drop it from every list.
    pub async fn delete(&self, post_id: &str) -> Result<(), ClientError> {
        let result = self.try_delete(post_id).await;
        self.ctx.settle_confirmed("Delete post", "Post deleted", result)
    }

    async fn try_delete(&self, post_id: &str) -> Result<(), ClientError> {
        self.ctx.api.delete_post(post_id).await?;
        self.ctx.store.remove::<Post>(post_id);
        if let Some(user_id) = self.ctx.session.user_id() {
            let patch = EntityPatch::user(
                user_id,
                UserDelta {
                    posts: -1,
                    ..Default::default()
                },
            );
            self.ctx.coordinator.apply_confirmed(&[patch]).await;
        }
        Ok(())
    }

    pub fn get(&self, post_id: &str) -> Option<Post> {
        self.ctx.store.post(post_id)
    }

    fn publish(&self, post: Post) {
        self.ctx.store.prepend(&QueryKey::Feed, post.clone());
        self.ctx.store.prepend(&QueryKey::MyPosts, post);
    }
}
