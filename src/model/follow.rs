use serde::{Deserialize, Serialize};

use super::Entity;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSummary {
    pub id: String,
    pub user_name: Option<String>,
    pub profile_image_url: Option<String>,
}

/// A follow edge between two users. `accepted` is false while a request to
/// a private account is pending.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Follow {
    pub id: String,
    pub follower_id: String,
    pub following_id: String,
    pub accepted: bool,
    pub follower: Option<UserSummary>,
    pub following: Option<UserSummary>,
    pub created_at: Option<String>,
}

impl Entity for Follow {
    fn id(&self) -> &str {
        &self.id
    }
}
