use crate::api::Upload;
use crate::error::ClientError;
use crate::model::{ChangePassword, Post, User, UserUpdate};
use crate::store::{FetchMode, PageOutcome, QueryKey};
use crate::validation;

use super::ClientContext;

/// Profiles, account settings and per-user post lists.
#[derive(Clone)]
pub struct ProfileService {
    ctx: ClientContext,
}

impl ProfileService {
    pub fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    pub async fn load(&self, user_id: &str) -> Result<User, ClientError> {
        let result = self.ctx.api.get_user(user_id).await.map_err(ClientError::from);
        if let Ok(user) = &result {
            self.ctx.store.upsert(user.clone());
        }
        self.ctx.settle("Loading profile", result)
    }

    /// Fetch the signed-in user and remember their id on the session.
    pub async fn load_current(&self) -> Result<User, ClientError> {
        let result = self.ctx.api.current_user().await.map_err(ClientError::from);
        if let Ok(user) = &result {
            self.ctx.session.set_user(user.id.clone());
            self.ctx.store.upsert(user.clone());
        }
        self.ctx.settle("Loading profile", result)
    }

    pub async fn update(&self, update: &UserUpdate) -> Result<Option<User>, ClientError> {
        let result = self.try_update(update).await;
        self.ctx
            .settle_confirmed("Update profile", "Profile updated", result)
    }

    async fn try_update(&self, update: &UserUpdate) -> Result<Option<User>, ClientError> {
        let updated = self.ctx.api.update_user(update).await?;
        if let Some(user) = &updated {
            self.ctx.store.upsert(user.clone());
        }
        Ok(updated)
    }

    pub async fn change_password(&self, change: &ChangePassword) -> Result<(), ClientError> {
        let result = self.try_change_password(change).await;
        self.ctx
            .settle_confirmed("Change password", "Password changed", result)
    }

    async fn try_change_password(&self, change: &ChangePassword) -> Result<(), ClientError> {
        validation::change_password(change)?;
        self.ctx.api.change_password(change).await?;
        Ok(())
    }

    /// Upload a new profile image and point the profile at it.
    pub async fn upload_image(&self, upload: &Upload) -> Result<String, ClientError> {
        let result = self.try_upload_image(upload).await;
        self.ctx
            .settle_confirmed("Upload image", "Profile image updated", result)
    }

    async fn try_upload_image(&self, upload: &Upload) -> Result<String, ClientError> {
        let user_id = self.ctx.user_id()?;
        let current = match self.ctx.store.user(&user_id) {
            Some(user) => user,
            None => self.ctx.api.current_user().await?,
        };

        let url = self.ctx.api.upload(upload).await?;
        let mut update = UserUpdate::from(&current);
        update.profile_image_url = Some(url.clone());

        let updated = self.ctx.api.update_user(&update).await?;
        let user = updated.unwrap_or_else(|| User {
            profile_image_url: Some(url.clone()),
            ..current
        });
        self.ctx.store.upsert(user);
        Ok(url)
    }

    /// Delete the account, then sign out locally.
    pub async fn delete_account(&self) -> Result<(), ClientError> {
        let result = self.try_delete_account().await;
        self.ctx
            .settle_confirmed("Delete account", "Account deleted", result)
    }

    async fn try_delete_account(&self) -> Result<(), ClientError> {
        self.ctx.api.delete_user().await?;
        self.ctx.session.clear();
        self.ctx.store.reset();
        Ok(())
    }

    pub async fn load_posts(&self, user_id: &str) -> Result<PageOutcome, ClientError> {
        self.fetch_user_posts(user_id, FetchMode::Initial).await
    }

    pub async fn load_more_posts(&self, user_id: &str) -> Result<PageOutcome, ClientError> {
        self.fetch_user_posts(user_id, FetchMode::Next).await
    }

    async fn fetch_user_posts(
        &self,
        user_id: &str,
        mode: FetchMode,
    ) -> Result<PageOutcome, ClientError> {
        let api = &self.ctx.api;
        self.ctx
            .load_list(
                "Loading posts",
                QueryKey::UserPosts(user_id.to_string()),
                mode,
                self.ctx.paging.profile_posts,
                |page, limit| api.user_posts(user_id, page, limit),
            )
            .await
    }

    pub fn posts(&self, user_id: &str) -> Vec<Post> {
        self.ctx
            .store
            .items(&QueryKey::UserPosts(user_id.to_string()))
    }

    pub async fn load_my_posts(&self) -> Result<PageOutcome, ClientError> {
        self.fetch_my_posts(FetchMode::Initial).await
    }

    pub async fn load_more_my_posts(&self) -> Result<PageOutcome, ClientError> {
        self.fetch_my_posts(FetchMode::Next).await
    }

    async fn fetch_my_posts(&self, mode: FetchMode) -> Result<PageOutcome, ClientError> {
        let api = &self.ctx.api;
        self.ctx
            .load_list(
                "Loading posts",
                QueryKey::MyPosts,
                mode,
                self.ctx.paging.profile_posts,
                |page, limit| api.my_posts(page, limit),
            )
            .await
    }

    pub fn my_posts(&self) -> Vec<Post> {
        self.ctx.store.items(&QueryKey::MyPosts)
    }

    pub fn get(&self, user_id: &str) -> Option<User> {
        self.ctx.store.user(user_id)
    }
}
