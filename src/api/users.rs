//! Authentication and user endpoints.

use reqwest::Method;
use serde_json::Value;

use crate::model::{
    AuthResponse, ChangePassword, ForgotPassword, NewUser, ResetPassword, SignIn, User, UserUpdate,
};

use super::http::json_body;
use super::{ApiError, HttpApi};

impl HttpApi {
    pub async fn sign_in(&self, credentials: &SignIn) -> Result<AuthResponse, ApiError> {
        self.post_auth("/api/User/sign-in", credentials).await
    }

    pub async fn register(&self, user: &NewUser) -> Result<AuthResponse, ApiError> {
        self.post_auth("/api/User/register", user).await
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.fetch(Method::GET, "/api/User/get-user", &[], None).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, ApiError> {
        let path = format!("/api/User/get-user/{}", user_id);
        self.fetch(Method::GET, &path, &[], None).await
    }

    /// `viewer_id` lets the server fill in the follow flags for the viewer.
    pub async fn search_users(
        &self,
        query: &str,
        page: u32,
        limit: u32,
        viewer_id: Option<&str>,
    ) -> Result<Vec<User>, ApiError> {
        let mut params = vec![
            ("q", query.to_string()),
            ("page", page.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(viewer_id) = viewer_id {
            params.push(("userId", viewer_id.to_string()));
        }
        let users: Option<Vec<User>> = self
            .submit(Method::GET, "/api/User/search", &params, None)
            .await?;
        Ok(users.unwrap_or_default())
    }

    pub async fn update_user(&self, update: &UserUpdate) -> Result<Option<User>, ApiError> {
        self.submit(Method::PUT, "/api/User/update-user", &[], Some(json_body(update)?))
            .await
    }

    pub async fn delete_user(&self) -> Result<(), ApiError> {
        self.submit::<Value>(Method::DELETE, "/api/User/delete-user", &[], None)
            .await
            .map(|_| ())
    }

    pub async fn change_password(&self, change: &ChangePassword) -> Result<(), ApiError> {
        self.submit::<Value>(
            Method::POST,
            "/api/User/change-password",
            &[],
            Some(json_body(change)?),
        )
        .await
        .map(|_| ())
    }

    /// Ask the server to email a reset link.
    pub async fn forgot_password(&self, request: &ForgotPassword) -> Result<(), ApiError> {
        self.submit::<Value>(
            Method::POST,
            "/api/User/forget-password",
            &[],
            Some(json_body(request)?),
        )
        .await
        .map(|_| ())
    }

    pub async fn reset_password(&self, reset: &ResetPassword) -> Result<(), ApiError> {
        self.submit::<Value>(
            Method::POST,
            "/api/User/reset-password",
            &[],
            Some(json_body(reset)?),
        )
        .await
        .map(|_| ())
    }
}
