use serde::{Deserialize, Serialize};

use super::Entity;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommentAuthor {
    pub id: String,
    pub user_name: String,
    pub profile_image_url: Option<String>,
    pub is_verified: bool,
}

/// A comment on a post; replies carry the parent comment id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub user: CommentAuthor,
    pub content: String,
    pub parent_id: Option<String>,
    pub replies_count: u64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

impl Entity for Comment {
    fn id(&self) -> &str {
        &self.id
    }
}
