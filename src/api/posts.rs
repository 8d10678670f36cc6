//! Post and like endpoints.

use reqwest::Method;
use serde_json::{json, Value};

use crate::model::{NewPost, Post, PostUpdate, SharePost};

use super::http::json_body;
use super::{ApiError, HttpApi};

/// Post list endpoints take capitalized paging parameters.
fn post_paging(page: u32, limit: u32) -> [(&'static str, String); 2] {
    [("Page", page.to_string()), ("Limit", limit.to_string())]
}

impl HttpApi {
    pub async fn feed(&self, page: u32, limit: u32) -> Result<Vec<Post>, ApiError> {
        self.post_list("/api/Posts/feed", page, limit).await
    }

    pub async fn my_posts(&self, page: u32, limit: u32) -> Result<Vec<Post>, ApiError> {
        self.post_list("/api/Posts/my-posts", page, limit).await
    }

    pub async fn user_posts(
        &self,
        user_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Post>, ApiError> {
        self.post_list(&format!("/api/Posts/user/{}", user_id), page, limit)
            .await
    }

    async fn post_list(&self, path: &str, page: u32, limit: u32) -> Result<Vec<Post>, ApiError> {
        let posts: Option<Vec<Post>> = self
            .submit(Method::GET, path, &post_paging(page, limit), None)
            .await?;
        Ok(posts.unwrap_or_default())
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Post, ApiError> {
        let path = format!("/api/Posts/{}", post_id);
        self.fetch(Method::GET, &path, &[], None).await
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Option<Post>, ApiError> {
        self.submit(Method::POST, "/api/Posts", &[], Some(json_body(post)?))
            .await
    }

    pub async fn update_post(&self, update: &PostUpdate) -> Result<Option<Post>, ApiError> {
        self.submit(Method::PUT, "/api/Posts", &[], Some(json_body(update)?))
            .await
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/Posts/{}", post_id);
        self.submit::<Value>(Method::DELETE, &path, &[], None)
            .await
            .map(|_| ())
    }

    pub async fn share_post(&self, share: &SharePost) -> Result<Option<Post>, ApiError> {
        self.submit(Method::POST, "/api/Posts/share", &[], Some(json_body(share)?))
            .await
    }

    /// The server flips the like state; no canonical post comes back.
    pub async fn toggle_like(&self, post_id: &str) -> Result<(), ApiError> {
        self.submit::<Value>(
            Method::POST,
            "/api/Like",
            &[],
            Some(json!({ "postId": post_id })),
        )
        .await
        .map(|_| ())
    }
}
