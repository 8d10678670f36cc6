use serde::{Deserialize, Serialize};

use super::Entity;

/// A user profile as seen by the signed-in viewer.
///
/// The `is_follower*` flags describe the viewer's relationship to this user:
/// `is_follower` means the viewer follows (or requested to follow) them,
/// `is_follower_accepted` means that follow is approved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub birth_date: Option<String>,
    pub bio: String,
    pub profile_image_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub is_verified: bool,
    pub is_private: bool,
    pub followers_count: u64,
    pub following_count: u64,
    pub posts_count: u64,
    pub roles: Vec<String>,
    pub is_follower: bool,
    pub is_follower_accepted: bool,
    pub is_following: bool,
    pub is_following_accepted: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.user_name.clone()
        } else {
            full.to_string()
        }
    }
}

impl Entity for User {
    fn id(&self) -> &str {
        &self.id
    }
}
