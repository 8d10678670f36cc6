//! Field-level deltas and the snapshot/restore contract.
//!
//! Only the fields an optimistic mutation may touch are captured; a
//! rollback restores exactly those and leaves everything else (e.g. an
//! edited title that arrived meanwhile) alone.

use std::fmt::Debug;

use crate::model::{Comment, Notification, Post, User};
use crate::store::Cached;

/// Apply a signed delta to a counter, clamping at zero.
pub fn apply_count(value: u64, delta: i64) -> u64 {
    value.saturating_add_signed(delta)
}

/// Entities that support optimistic patches.
pub trait Optimistic: Cached {
    /// The patchable fields, captured before a mutation.
    type Fields: Clone + Debug + PartialEq + Send + Sync;
    type Delta: Clone + Debug + PartialEq + Send + Sync;

    fn capture(&self) -> Self::Fields;
    fn restore(&mut self, fields: Self::Fields);
    fn apply(&mut self, delta: &Self::Delta);
}

/// Immutable copy of one entity's patchable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot<T: Optimistic> {
    pub id: String,
    pub fields: T::Fields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDelta {
    pub is_liked: Option<bool>,
    /// Flip the like state relative to whatever the post holds when the
    /// patch lands.
    pub toggle_like: bool,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
}

impl PostDelta {
    /// Like (`true`) or unlike (`false`), moving the count with it.
    pub fn like(liked: bool) -> Self {
        Self {
            is_liked: Some(liked),
            likes: if liked { 1 } else { -1 },
            ..Default::default()
        }
    }

    pub fn toggle_like() -> Self {
        Self {
            toggle_like: true,
            ..Default::default()
        }
    }

    pub fn comments(delta: i64) -> Self {
        Self {
            comments: delta,
            ..Default::default()
        }
    }

    pub fn shares(delta: i64) -> Self {
        Self {
            shares: delta,
            ..Default::default()
        }
    }

    /// The inverse patch. Flags are assumed to have been flipped.
    pub fn reversed(&self) -> Self {
        Self {
            is_liked: self.is_liked.map(|liked| !liked),
            toggle_like: self.toggle_like,
            likes: -self.likes,
            comments: -self.comments,
            shares: -self.shares,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFields {
    pub is_liked: bool,
    pub likes_count: u64,
    pub comments_count: u64,
    pub shares_count: u64,
}

impl Optimistic for Post {
    type Fields = PostFields;
    type Delta = PostDelta;

    fn capture(&self) -> PostFields {
        PostFields {
            is_liked: self.is_liked,
            likes_count: self.likes_count,
            comments_count: self.comments_count,
            shares_count: self.shares_count,
        }
    }

    fn restore(&mut self, fields: PostFields) {
        self.is_liked = fields.is_liked;
        self.likes_count = fields.likes_count;
        self.comments_count = fields.comments_count;
        self.shares_count = fields.shares_count;
    }

    fn apply(&mut self, delta: &PostDelta) {
        if let Some(liked) = delta.is_liked {
            self.is_liked = liked;
        }
        if delta.toggle_like {
            self.is_liked = !self.is_liked;
            let step = if self.is_liked { 1 } else { -1 };
            self.likes_count = apply_count(self.likes_count, step);
        }
        self.likes_count = apply_count(self.likes_count, delta.likes);
        self.comments_count = apply_count(self.comments_count, delta.comments);
        self.shares_count = apply_count(self.shares_count, delta.shares);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDelta {
    pub is_follower: Option<bool>,
    pub is_follower_accepted: Option<bool>,
    pub followers: i64,
    pub following: i64,
    pub posts: i64,
}

impl UserDelta {
    pub fn followers(delta: i64) -> Self {
        Self {
            followers: delta,
            ..Default::default()
        }
    }

    pub fn following(delta: i64) -> Self {
        Self {
            following: delta,
            ..Default::default()
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            is_follower: self.is_follower.map(|flag| !flag),
            is_follower_accepted: self.is_follower_accepted.map(|flag| !flag),
            followers: -self.followers,
            following: -self.following,
            posts: -self.posts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub is_follower: bool,
    pub is_follower_accepted: bool,
    pub followers_count: u64,
    pub following_count: u64,
    pub posts_count: u64,
}

impl Optimistic for User {
    type Fields = UserFields;
    type Delta = UserDelta;

    fn capture(&self) -> UserFields {
        UserFields {
            is_follower: self.is_follower,
            is_follower_accepted: self.is_follower_accepted,
            followers_count: self.followers_count,
            following_count: self.following_count,
            posts_count: self.posts_count,
        }
    }

    fn restore(&mut self, fields: UserFields) {
        self.is_follower = fields.is_follower;
        self.is_follower_accepted = fields.is_follower_accepted;
        self.followers_count = fields.followers_count;
        self.following_count = fields.following_count;
        self.posts_count = fields.posts_count;
    }

    fn apply(&mut self, delta: &UserDelta) {
        if let Some(flag) = delta.is_follower {
            self.is_follower = flag;
        }
        if let Some(flag) = delta.is_follower_accepted {
            self.is_follower_accepted = flag;
        }
        self.followers_count = apply_count(self.followers_count, delta.followers);
        self.following_count = apply_count(self.following_count, delta.following);
        self.posts_count = apply_count(self.posts_count, delta.posts);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentDelta {
    pub replies: i64,
}

impl CommentDelta {
    pub fn reversed(&self) -> Self {
        Self {
            replies: -self.replies,
        }
    }
}

impl Optimistic for Comment {
    type Fields = u64;
    type Delta = CommentDelta;

    fn capture(&self) -> u64 {
        self.replies_count
    }

    fn restore(&mut self, replies_count: u64) {
        self.replies_count = replies_count;
    }

    fn apply(&mut self, delta: &CommentDelta) {
        self.replies_count = apply_count(self.replies_count, delta.replies);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationDelta {
    pub is_read: Option<bool>,
}

impl NotificationDelta {
    pub fn read() -> Self {
        Self {
            is_read: Some(true),
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            is_read: self.is_read.map(|read| !read),
        }
    }
}

impl Optimistic for Notification {
    type Fields = bool;
    type Delta = NotificationDelta;

    fn capture(&self) -> bool {
        self.is_read
    }

    fn restore(&mut self, is_read: bool) {
        self.is_read = is_read;
    }

    fn apply(&mut self, delta: &NotificationDelta) {
        if let Some(read) = delta.is_read {
            self.is_read = read;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unlike_at_zero_clamps() {
        let mut post = Post {
            is_liked: true,
            likes_count: 0,
            ..Default::default()
        };
        post.apply(&PostDelta::like(false));
        assert!(!post.is_liked);
        assert_eq!(post.likes_count, 0);
    }

    #[test]
    fn test_restore_round_trips() {
        let mut user = User {
            followers_count: 3,
            ..Default::default()
        };
        let before = user.capture();
        user.apply(&UserDelta {
            is_follower: Some(true),
            is_follower_accepted: Some(true),
            followers: 1,
            ..Default::default()
        });
        assert_eq!(user.followers_count, 4);
        user.restore(before.clone());
        assert_eq!(user.capture(), before);
    }

    #[test]
    fn test_toggle_like_is_relative() {
        let mut post = Post {
            likes_count: 3,
            ..Default::default()
        };
        post.apply(&PostDelta::toggle_like());
        assert!(post.is_liked);
        assert_eq!(post.likes_count, 4);
        post.apply(&PostDelta::toggle_like().reversed());
        assert!(!post.is_liked);
        assert_eq!(post.likes_count, 3);
    }

    #[test]
    fn test_reversed_like() {
        assert_eq!(PostDelta::like(true).reversed(), PostDelta::like(false));
    }

    proptest! {
        #[test]
        fn clamp_matches_signed_arithmetic(value in 0u64..10_000, delta in -20_000i64..20_000) {
            let expected = (value as i64 + delta).max(0) as u64;
            prop_assert_eq!(apply_count(value, delta), expected);
        }
    }
}
