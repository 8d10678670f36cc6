use crate::error::ClientError;
use crate::model::Notification;
use crate::mutation::{EntityPatch, MutationIntent, NotificationDelta};
use crate::store::{FetchMode, ListState, PageOutcome, QueryKey};

use super::ClientContext;

/// The signed-in user's notifications.
#[derive(Clone)]
pub struct NotificationService {
    ctx: ClientContext,
}

impl NotificationService {
    pub fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    pub async fn load(&self) -> Result<PageOutcome, ClientError> {
        self.fetch(false, FetchMode::Initial).await
    }

    pub async fn load_more(&self) -> Result<PageOutcome, ClientError> {
        self.fetch(false, FetchMode::Next).await
    }

    pub async fn load_unread(&self) -> Result<PageOutcome, ClientError> {
        self.fetch(true, FetchMode::Initial).await
    }

    pub async fn load_more_unread(&self) -> Result<PageOutcome, ClientError> {
        self.fetch(true, FetchMode::Next).await
    }

    async fn fetch(&self, unread: bool, mode: FetchMode) -> Result<PageOutcome, ClientError> {
        let user_id = match self.ctx.user_id() {
            Ok(user_id) => user_id,
            Err(err) => return self.ctx.settle("Loading notifications", Err(err)),
        };
        let api = &self.ctx.api;
        let page_size = self.ctx.paging.notifications;
        let uid = user_id.as_str();

        if unread {
            self.ctx
                .load_list(
                    "Loading notifications",
                    QueryKey::UnreadNotifications(user_id.clone()),
                    mode,
                    page_size,
                    |page, limit| api.unread_notifications(uid, page, limit),
                )
                .await
        } else {
            self.ctx
                .load_list(
                    "Loading notifications",
                    QueryKey::Notifications(user_id.clone()),
                    mode,
                    page_size,
                    |page, limit| api.notifications(uid, page, limit),
                )
                .await
        }
    }

    fn key(&self) -> Option<QueryKey> {
        self.ctx.session.user_id().map(QueryKey::Notifications)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.key()
            .map(|key| self.ctx.store.items(&key))
            .unwrap_or_default()
    }

    pub fn unread(&self) -> Vec<Notification> {
        self.ctx
            .session
            .user_id()
            .map(|uid| self.ctx.store.items(&QueryKey::UnreadNotifications(uid)))
            .unwrap_or_default()
    }

    pub fn state(&self) -> ListState {
        self.key()
            .and_then(|key| self.ctx.store.list(&key))
            .unwrap_or_default()
    }

    /// Unread notifications among those loaded.
    pub fn unread_count(&self) -> usize {
        self.notifications().iter().filter(|n| !n.is_read).count()
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<(), ClientError> {
        let intent = MutationIntent::new(
            "mark-read",
            vec![EntityPatch::notification(
                notification_id,
                NotificationDelta::read(),
            )],
        );
        let api = &self.ctx.api;
        let result = self
            .ctx
            .coordinator
            .apply_optimistic(intent, async {
                api.mark_notification_read(notification_id)
                    .await
                    .map(|_| None)
            })
            .await
            .map_err(ClientError::from);
        self.ctx.settle("Mark as read", result)
    }

    /// Mark every loaded notification read; all of them revert together on
    /// failure.
    pub async fn mark_all_read(&self) -> Result<(), ClientError> {
        let result = self.try_mark_all_read().await;
        self.ctx.settle("Mark all as read", result)
    }

    async fn try_mark_all_read(&self) -> Result<(), ClientError> {
        let user_id = self.ctx.user_id()?;
        let forward: Vec<EntityPatch> = self
            .notifications()
            .into_iter()
            .filter(|n| !n.is_read)
            .map(|n| EntityPatch::notification(n.id, NotificationDelta::read()))
            .collect();

        let api = &self.ctx.api;
        self.ctx
            .coordinator
            .apply_optimistic(MutationIntent::new("mark-all-read", forward), async {
                api.mark_all_notifications_read(&user_id)
                    .await
                    .map(|_| None)
            })
            .await?;
        Ok(())
    }

    pub async fn delete(&self, notification_id: &str) -> Result<(), ClientError> {
        let result = self.try_delete(notification_id).await;
        self.ctx
            .settle_confirmed("Delete notification", "Notification deleted", result)
    }

    async fn try_delete(&self, notification_id: &str) -> Result<(), ClientError> {
        self.ctx.api.delete_notification(notification_id).await?;
        self.ctx.store.remove::<Notification>(notification_id);
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<(), ClientError> {
        let result = self.try_delete_all().await;
        self.ctx
            .settle_confirmed("Delete notifications", "All notifications deleted", result)
    }

    async fn try_delete_all(&self) -> Result<(), ClientError> {
        let user_id = self.ctx.user_id()?;
        self.ctx.api.delete_all_notifications(&user_id).await?;
        self.ctx.store.discard(&QueryKey::Notifications(user_id.clone()));
        self.ctx
            .store
            .discard(&QueryKey::UnreadNotifications(user_id));
        Ok(())
    }
}
