//! Entities returned by the REST API and the payloads sent to it.
//!
//! Field names follow the API's camelCase JSON. Every entity is keyed by a
//! string id; the store normalizes on that id.

mod comment;
mod follow;
mod notification;
mod payloads;
mod post;
mod user;

pub use comment::{Comment, CommentAuthor};
pub use follow::{Follow, UserSummary};
pub use notification::{Notification, NotificationKind, NotificationTarget};
pub use payloads::{
    AuthResponse, ChangePassword, FollowRequest, ForgotPassword, NewComment, NewMedia, NewPost,
    NewReply, NewUser, PostUpdate, RefreshRequest, ResetPassword, SharePost, SignIn,
    UpdateComment, UserUpdate,
};
pub use post::{Media, Post, PostAuthor, Visibility};
pub use user::User;

/// Anything the store can hold: an entity addressable by a stable id.
pub trait Entity {
    fn id(&self) -> &str;
}
