//! Follow relationship endpoints.

use reqwest::Method;
use serde_json::Value;

use crate::model::{Follow, FollowRequest};

use super::http::json_body;
use super::{ApiError, HttpApi};

impl HttpApi {
    pub async fn follow(&self, request: &FollowRequest) -> Result<(), ApiError> {
        self.follow_action("/api/Follow/follow", request).await
    }

    pub async fn unfollow(&self, request: &FollowRequest) -> Result<(), ApiError> {
        self.follow_action("/api/Follow/unfollow", request).await
    }

    pub async fn accept_follow_request(&self, request: &FollowRequest) -> Result<(), ApiError> {
        self.follow_action("/api/Follow/accept-follow-request", request)
            .await
    }

    pub async fn reject_follow_request(&self, request: &FollowRequest) -> Result<(), ApiError> {
        self.follow_action("/api/Follow/reject-follow-request", request)
            .await
    }

    async fn follow_action(&self, path: &str, request: &FollowRequest) -> Result<(), ApiError> {
        self.submit::<Value>(Method::POST, path, &[], Some(json_body(request)?))
            .await
            .map(|_| ())
    }

    pub async fn followers(&self, page: u32, limit: u32) -> Result<Vec<Follow>, ApiError> {
        self.follow_list("/api/Follow/followers", page, limit).await
    }

    pub async fn following(&self, page: u32, limit: u32) -> Result<Vec<Follow>, ApiError> {
        self.follow_list("/api/Follow/following", page, limit).await
    }

    pub async fn pending_follow_requests(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Follow>, ApiError> {
        self.follow_list("/api/Follow/pending-follow-requests", page, limit)
            .await
    }

    async fn follow_list(
        &self,
        path: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Follow>, ApiError> {
        let params = [("page", page.to_string()), ("limit", limit.to_string())];
        let follows: Option<Vec<Follow>> = self.submit(Method::GET, path, &params, None).await?;
        Ok(follows.unwrap_or_default())
    }
}
