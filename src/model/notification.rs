use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Entity, User};

/// The fixed set of notification kinds the API emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    Share,
    Follow,
    FollowRequest,
    Like,
    Comment,
    CommentReply,
}

impl NotificationKind {
    /// Badge text ("comment reply", "follow request", ...).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Share => "share",
            Self::Follow => "follow",
            Self::FollowRequest => "follow request",
            Self::Like => "like",
            Self::Comment => "comment",
            Self::CommentReply => "comment reply",
        }
    }
}

/// Where activating a notification leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationTarget {
    Post(String),
    Comment(String),
    Profile(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub sender_user: User,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub comment_id: Option<String>,
    #[serde(default)]
    pub follower_id: Option<String>,
    #[serde(default)]
    pub like_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Notification {
    /// Navigation target, if the payload carries the id it needs.
    pub fn target(&self) -> Option<NotificationTarget> {
        match self.kind {
            NotificationKind::Like | NotificationKind::Comment | NotificationKind::Share => {
                self.post_id.clone().map(NotificationTarget::Post)
            }
            NotificationKind::CommentReply => {
                self.comment_id.clone().map(NotificationTarget::Comment)
            }
            NotificationKind::Follow | NotificationKind::FollowRequest => {
                Some(NotificationTarget::Profile(self.sender_user.id.clone()))
            }
        }
    }

    /// Message text with the leading sender name removed; the sender is
    /// rendered separately.
    pub fn body(&self) -> &str {
        match self.message.split_once(' ') {
            Some((_, rest)) => rest,
            None => "",
        }
    }

    /// Decode a page of raw notifications, dropping records whose kind is
    /// not one this client knows.
    pub fn decode_page(raw: Vec<Value>) -> Vec<Notification> {
        raw.into_iter()
            .filter_map(|value| match serde_json::from_value::<Notification>(value) {
                Ok(notification) => Some(notification),
                Err(err) => {
                    tracing::warn!(error = %err, "Dropping undecodable notification");
                    None
                }
            })
            .collect()
    }
}

impl Entity for Notification {
    fn id(&self) -> &str {
        &self.id
    }
}
