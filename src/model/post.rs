use serde::{Deserialize, Serialize};

use super::Entity;

/// Who may see a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    #[serde(alias = "Public")]
    Public,
    #[serde(alias = "Private")]
    Private,
}

/// Author summary embedded in a post.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostAuthor {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub profile_image_url: Option<String>,
    pub is_verified: bool,
    pub is_private: bool,
}

/// A media attachment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Media {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub user: PostAuthor,
    pub title: Option<String>,
    pub content: Option<String>,
    pub visibility: Visibility,
    pub likes_count: u64,
    /// The API spells this counter `shareingsCount`.
    #[serde(rename = "shareingsCount")]
    pub shares_count: u64,
    pub comments_count: u64,
    pub is_liked: bool,
    pub media: Vec<Media>,
    pub parent_post_id: Option<String>,
    pub parent_post: Option<Box<Post>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Post {
    /// True for posts created by sharing another post.
    pub fn is_share(&self) -> bool {
        self.parent_post_id.is_some()
    }
}

impl Entity for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_api_shape() {
        let json = r#"{
            "id": "p1",
            "userId": "u1",
            "user": {"id": "u1", "userName": "ada"},
            "content": "hello",
            "visibility": "public",
            "likesCount": 3,
            "shareingsCount": 1,
            "commentsCount": 2,
            "isLiked": false,
            "media": [{"id": "m1", "type": "image", "url": "https://cdn/x.png"}]
        }"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, "p1");
        assert_eq!(post.shares_count, 1);
        assert_eq!(post.media[0].kind, "image");
        assert!(!post.is_share());
    }

    #[test]
    fn test_missing_fields_default() {
        let post: Post = serde_json::from_str(r#"{"id": "p2"}"#).unwrap();
        assert_eq!(post.likes_count, 0);
        assert_eq!(post.visibility, Visibility::Public);
    }
}
