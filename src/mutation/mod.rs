//! Optimistic mutations.
//!
//! A [`MutationIntent`] lists field-level patches. The [`Coordinator`]
//! applies them to the store in one write, runs the remote call, then
//! keeps the patch, swaps in the server's canonical record, or rolls
//! back.

mod coordinator;
mod delta;
mod patch;

pub use coordinator::{Coordinator, MutationIntent, Rollback};
pub use delta::{
    apply_count, CommentDelta, EntitySnapshot, NotificationDelta, Optimistic, PostDelta,
    PostFields, UserDelta, UserFields,
};
pub use patch::{Canonical, EntityPatch};
