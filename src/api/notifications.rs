//! Notification endpoints.

use reqwest::Method;
use serde_json::Value;

use crate::model::Notification;
use crate::store::Page;

use super::{ApiError, HttpApi};

impl HttpApi {
    pub async fn notifications(
        &self,
        user_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<Notification>, ApiError> {
        let path = format!("/api/Notifications/user/{}", user_id);
        self.notification_list(&path, page, limit).await
    }

    pub async fn unread_notifications(
        &self,
        user_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<Notification>, ApiError> {
        let path = format!("/api/Notifications/user/{}/unread", user_id);
        self.notification_list(&path, page, limit).await
    }

    /// Records of unknown kinds are dropped, not failed on. The page keeps
    /// the raw count so a dropped record does not end pagination.
    async fn notification_list(
        &self,
        path: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<Notification>, ApiError> {
        let params = [("page", page.to_string()), ("limit", limit.to_string())];
        let raw: Option<Vec<Value>> = self.submit(Method::GET, path, &params, None).await?;
        let raw = raw.unwrap_or_default();
        let fetched = raw.len();
        Ok(Page::new(Notification::decode_page(raw), fetched))
    }

    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/Notifications/{}/mark-read", notification_id);
        self.notification_action(Method::POST, &path).await
    }

    pub async fn mark_all_notifications_read(&self, user_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/Notifications/user/{}/mark-all-read", user_id);
        self.notification_action(Method::POST, &path).await
    }

    pub async fn delete_notification(&self, notification_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/Notifications/{}", notification_id);
        self.notification_action(Method::DELETE, &path).await
    }

    pub async fn delete_all_notifications(&self, user_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/Notifications/user/{}/all", user_id);
        self.notification_action(Method::DELETE, &path).await
    }

    async fn notification_action(&self, method: Method, path: &str) -> Result<(), ApiError> {
        self.submit::<Value>(method, path, &[], None)
            .await
            .map(|_| ())
    }
}
