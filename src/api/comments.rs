//! Comment and reply endpoints.

use reqwest::Method;
use serde_json::Value;

use crate::model::{Comment, NewComment, NewReply, UpdateComment};

use super::http::json_body;
use super::{ApiError, HttpApi};

impl HttpApi {
    pub async fn post_comments(
        &self,
        post_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Comment>, ApiError> {
        let path = format!("/api/Comments/post/{}", post_id);
        let params = [("page", page.to_string()), ("limit", limit.to_string())];
        let comments: Option<Vec<Comment>> =
            self.submit(Method::GET, &path, &params, None).await?;
        Ok(comments.unwrap_or_default())
    }

    /// Replies are not paginated by the server.
    pub async fn comment_replies(&self, parent_id: &str) -> Result<Vec<Comment>, ApiError> {
        let path = format!("/api/Comments/reply/{}", parent_id);
        let replies: Option<Vec<Comment>> = self.submit(Method::GET, &path, &[], None).await?;
        Ok(replies.unwrap_or_default())
    }

    pub async fn create_comment(&self, comment: &NewComment) -> Result<Option<Comment>, ApiError> {
        self.submit(Method::POST, "/api/Comments", &[], Some(json_body(comment)?))
            .await
    }

    pub async fn create_reply(&self, reply: &NewReply) -> Result<Option<Comment>, ApiError> {
        self.submit(
            Method::POST,
            "/api/Comments/reply",
            &[],
            Some(json_body(reply)?),
        )
        .await
    }

    pub async fn update_comment(
        &self,
        comment_id: &str,
        update: &UpdateComment,
    ) -> Result<Option<Comment>, ApiError> {
        let path = format!("/api/Comments/{}", comment_id);
        self.submit(Method::PUT, &path, &[], Some(json_body(update)?))
            .await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/Comments/{}", comment_id);
        self.submit::<Value>(Method::DELETE, &path, &[], None)
            .await
            .map(|_| ())
    }

    pub async fn delete_reply(&self, reply_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/Comments/reply/{}", reply_id);
        self.submit::<Value>(Method::DELETE, &path, &[], None)
            .await
            .map(|_| ())
    }
}
