use crate::error::ClientError;
use crate::model::{Comment, NewComment, NewReply, UpdateComment};
use crate::mutation::{CommentDelta, EntityPatch, PostDelta};
use crate::store::{FetchMode, ListState, PageOutcome, QueryKey};
use crate::validation;

use super::ClientContext;

/// Reply lists come back whole; a page size no response can reach keeps
/// `has_more` false.
const UNPAGED: u32 = u32::MAX;

/// Comment threads under a post.
#[derive(Clone)]
pub struct CommentsService {
    ctx: ClientContext,
}

impl CommentsService {
    pub fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    pub async fn load(&self, post_id: &str) -> Result<PageOutcome, ClientError> {
        self.fetch(post_id, FetchMode::Initial).await
    }

    pub async fn load_more(&self, post_id: &str) -> Result<PageOutcome, ClientError> {
        self.fetch(post_id, FetchMode::Next).await
    }

    pub async fn refresh(&self, post_id: &str) -> Result<PageOutcome, ClientError> {
        self.fetch(post_id, FetchMode::Initial).await
    }

    async fn fetch(&self, post_id: &str, mode: FetchMode) -> Result<PageOutcome, ClientError> {
        let api = &self.ctx.api;
        self.ctx
            .load_list(
                "Loading comments",
                QueryKey::Comments(post_id.to_string()),
                mode,
                self.ctx.paging.comments,
                |page, limit| api.post_comments(post_id, page, limit),
            )
            .await
    }

    pub fn comments(&self, post_id: &str) -> Vec<Comment> {
        self.ctx
            .store
            .items(&QueryKey::Comments(post_id.to_string()))
    }

    pub fn state(&self, post_id: &str) -> ListState {
        self.ctx
            .store
            .list(&QueryKey::Comments(post_id.to_string()))
            .unwrap_or_default()
    }

    /// Load every reply to a comment.
    pub async fn load_replies(&self, comment_id: &str) -> Result<Vec<Comment>, ClientError> {
        let api = &self.ctx.api;
        let key = QueryKey::Replies(comment_id.to_string());
        self.ctx
            .load_list(
                "Loading replies",
                key.clone(),
                FetchMode::Initial,
                UNPAGED,
                |_, _| api.comment_replies(comment_id),
            )
            .await?;
        Ok(self.ctx.store.items(&key))
    }

    pub fn replies(&self, comment_id: &str) -> Vec<Comment> {
        self.ctx
            .store
            .items(&QueryKey::Replies(comment_id.to_string()))
    }

    pub async fn add_comment(
        &self,
        post_id: &str,
        content: &str,
    ) -> Result<Option<Comment>, ClientError> {
        let result = self.try_add_comment(post_id, content).await;
        self.ctx.settle_confirmed("Comment", "Comment added", result)
    }

    async fn try_add_comment(
        &self,
        post_id: &str,
        content: &str,
    ) -> Result<Option<Comment>, ClientError> {
        validation::comment(content)?;
        let request = NewComment {
            post_id: post_id.to_string(),
            content: content.trim().to_string(),
        };
        let created = self.ctx.api.create_comment(&request).await?;
        if let Some(comment) = &created {
            self.ctx.store.upsert(comment.clone());
        }
        self.ctx
            .coordinator
            .apply_confirmed(&[EntityPatch::post(post_id, PostDelta::comments(1))])
            .await;
        self.reload(post_id).await;
        Ok(created)
    }

    pub async fn add_reply(
        &self,
        post_id: &str,
        parent_id: &str,
        content: &str,
    ) -> Result<Option<Comment>, ClientError> {
        let result = self.try_add_reply(post_id, parent_id, content).await;
        self.ctx.settle_confirmed("Reply", "Reply added", result)
    }

    async fn try_add_reply(
        &self,
        post_id: &str,
        parent_id: &str,
        content: &str,
    ) -> Result<Option<Comment>, ClientError> {
        validation::comment(content)?;
        let request = NewReply {
            post_id: post_id.to_string(),
            parent_id: parent_id.to_string(),
            content: content.trim().to_string(),
        };
        let created = self.ctx.api.create_reply(&request).await?;
        if let Some(reply) = &created {
            self.ctx.store.upsert(reply.clone());
        }
        self.ctx
            .coordinator
            .apply_confirmed(&[EntityPatch::comment(parent_id, CommentDelta { replies: 1 })])
            .await;
        self.reload_replies(parent_id).await;
        Ok(created)
    }

    pub async fn update_comment(
        &self,
        comment_id: &str,
        content: &str,
    ) -> Result<Option<Comment>, ClientError> {
        let result = self.try_update_comment(comment_id, content).await;
        self.ctx
            .settle_confirmed("Edit comment", "Comment updated", result)
    }

    async fn try_update_comment(
        &self,
        comment_id: &str,
        content: &str,
    ) -> Result<Option<Comment>, ClientError> {
        validation::comment(content)?;
        let request = UpdateComment {
            content: content.trim().to_string(),
        };
        let updated = self.ctx.api.update_comment(comment_id, &request).await?;
        match &updated {
            Some(comment) => self.ctx.store.upsert(comment.clone()),
            None => {
                if let Some(mut cached) = self.ctx.store.comment(comment_id) {
                    cached.content = request.content;
                    self.ctx.store.upsert(cached);
                }
            }
        }
        Ok(updated)
    }

    pub async fn remove_comment(&self, post_id: &str, comment_id: &str) -> Result<(), ClientError> {
        let result = self.try_remove_comment(post_id, comment_id).await;
        self.ctx
            .settle_confirmed("Delete comment", "Comment deleted", result)
    }

    async fn try_remove_comment(&self, post_id: &str, comment_id: &str) -> Result<(), ClientError> {
        self.ctx.api.delete_comment(comment_id).await?;
        self.ctx.store.remove::<Comment>(comment_id);
        self.ctx.store.discard(&QueryKey::Replies(comment_id.to_string()));
        self.ctx
            .coordinator
            .apply_confirmed(&[EntityPatch::post(post_id, PostDelta::comments(-1))])
            .await;
        self.reload(post_id).await;
        Ok(())
    }

    pub async fn remove_reply(&self, parent_id: &str, reply_id: &str) -> Result<(), ClientError> {
        let result = self.try_remove_reply(parent_id, reply_id).await;
        self.ctx
            .settle_confirmed("Delete reply", "Reply deleted", result)
    }

    async fn try_remove_reply(&self, parent_id: &str, reply_id: &str) -> Result<(), ClientError> {
        self.ctx.api.delete_reply(reply_id).await?;
        self.ctx.store.remove::<Comment>(reply_id);
        self.ctx
            .coordinator
            .apply_confirmed(&[EntityPatch::comment(parent_id, CommentDelta { replies: -1 })])
            .await;
        Ok(())
    }

    async fn reload(&self, post_id: &str) {
        let api = &self.ctx.api;
        self.ctx
            .refetch(
                QueryKey::Comments(post_id.to_string()),
                self.ctx.paging.comments,
                |page, limit| api.post_comments(post_id, page, limit),
            )
            .await;
    }

    async fn reload_replies(&self, parent_id: &str) {
        let api = &self.ctx.api;
        self.ctx
            .refetch(QueryKey::Replies(parent_id.to_string()), UNPAGED, |_, _| {
                api.comment_replies(parent_id)
            })
            .await;
    }
}
