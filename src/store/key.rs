//! Query identities for cached lists.

use std::fmt;

/// Entity table a list's ids point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Post,
    User,
    Comment,
    Notification,
    Follow,
}

/// Identity of a cached list. Two fetches with equal keys share one list;
/// distinct filter values (search terms, post ids) never merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKey {
    Feed,
    MyPosts,
    UserPosts(String),
    Comments(String),
    Replies(String),
    Notifications(String),
    UnreadNotifications(String),
    Search(String),
    Followers,
    Following,
    PendingFollows,
}

impl QueryKey {
    /// Kind of entity the list holds.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Feed | Self::MyPosts | Self::UserPosts(_) => EntityKind::Post,
            Self::Comments(_) | Self::Replies(_) => EntityKind::Comment,
            Self::Notifications(_) | Self::UnreadNotifications(_) => EntityKind::Notification,
            Self::Search(_) => EntityKind::User,
            Self::Followers | Self::Following | Self::PendingFollows => EntityKind::Follow,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feed => write!(f, "feed"),
            Self::MyPosts => write!(f, "my-posts"),
            Self::UserPosts(user_id) => write!(f, "posts:{}", user_id),
            Self::Comments(post_id) => write!(f, "comments:{}", post_id),
            Self::Replies(comment_id) => write!(f, "replies:{}", comment_id),
            Self::Notifications(user_id) => write!(f, "notifications:{}", user_id),
            Self::UnreadNotifications(user_id) => write!(f, "notifications-unread:{}", user_id),
            Self::Search(query) => write!(f, "search:{}", query),
            Self::Followers => write!(f, "followers"),
            Self::Following => write!(f, "following"),
            Self::PendingFollows => write!(f, "follow-requests"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_cache_addressing() {
        assert_eq!(QueryKey::Feed.to_string(), "feed");
        assert_eq!(QueryKey::Comments("p1".into()).to_string(), "comments:p1");
        assert_eq!(QueryKey::Search("rust".into()).to_string(), "search:rust");
    }

    #[test]
    fn test_kind() {
        assert_eq!(QueryKey::UserPosts("u".into()).kind(), EntityKind::Post);
        assert_eq!(QueryKey::Search("q".into()).kind(), EntityKind::User);
        assert_eq!(QueryKey::PendingFollows.kind(), EntityKind::Follow);
    }
}
