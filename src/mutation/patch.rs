//! Heterogeneous patches over the entity tables.

use crate::model::{Comment, Notification, Post, User};
use crate::store::{EntityKind, Tables};

use super::delta::{
    CommentDelta, EntitySnapshot, NotificationDelta, Optimistic, PostDelta, UserDelta,
};

/// One field-level patch to one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityPatch {
    Post { id: String, delta: PostDelta },
    User { id: String, delta: UserDelta },
    Comment { id: String, delta: CommentDelta },
    Notification { id: String, delta: NotificationDelta },
}

impl EntityPatch {
    pub fn post(id: impl Into<String>, delta: PostDelta) -> Self {
        EntityPatch::Post {
            id: id.into(),
            delta,
        }
    }

    pub fn user(id: impl Into<String>, delta: UserDelta) -> Self {
        EntityPatch::User {
            id: id.into(),
            delta,
        }
    }

    pub fn comment(id: impl Into<String>, delta: CommentDelta) -> Self {
        EntityPatch::Comment {
            id: id.into(),
            delta,
        }
    }

    pub fn notification(id: impl Into<String>, delta: NotificationDelta) -> Self {
        EntityPatch::Notification {
            id: id.into(),
            delta,
        }
    }

    /// The entity this patch targets.
    pub fn target(&self) -> (EntityKind, &str) {
        match self {
            EntityPatch::Post { id, .. } => (EntityKind::Post, id),
            EntityPatch::User { id, .. } => (EntityKind::User, id),
            EntityPatch::Comment { id, .. } => (EntityKind::Comment, id),
            EntityPatch::Notification { id, .. } => (EntityKind::Notification, id),
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            EntityPatch::Post { id, delta } => EntityPatch::post(id.clone(), delta.reversed()),
            EntityPatch::User { id, delta } => EntityPatch::user(id.clone(), delta.reversed()),
            EntityPatch::Comment { id, delta } => {
                EntityPatch::comment(id.clone(), delta.reversed())
            }
            EntityPatch::Notification { id, delta } => {
                EntityPatch::notification(id.clone(), delta.reversed())
            }
        }
    }

    /// Apply to the cached record, returning its pre-patch snapshot.
    /// Entities that are not cached are skipped.
    pub(crate) fn apply(&self, tables: &mut Tables) -> Option<Snapshot> {
        match self {
            EntityPatch::Post { id, delta } => patch::<Post>(tables, id, delta).map(Snapshot::Post),
            EntityPatch::User { id, delta } => patch::<User>(tables, id, delta).map(Snapshot::User),
            EntityPatch::Comment { id, delta } => {
                patch::<Comment>(tables, id, delta).map(Snapshot::Comment)
            }
            EntityPatch::Notification { id, delta } => {
                patch::<Notification>(tables, id, delta).map(Snapshot::Notification)
            }
        }
    }
}

fn patch<T: Optimistic>(
    tables: &mut Tables,
    id: &str,
    delta: &T::Delta,
) -> Option<EntitySnapshot<T>> {
    let entity = T::table_mut(tables).get_mut(id)?;
    let snapshot = EntitySnapshot {
        id: id.to_string(),
        fields: entity.capture(),
    };
    entity.apply(delta);
    Some(snapshot)
}

/// Snapshot of any optimistic entity.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Snapshot {
    Post(EntitySnapshot<Post>),
    User(EntitySnapshot<User>),
    Comment(EntitySnapshot<Comment>),
    Notification(EntitySnapshot<Notification>),
}

impl Snapshot {
    pub(crate) fn target(&self) -> (EntityKind, &str) {
        match self {
            Snapshot::Post(s) => (EntityKind::Post, &s.id),
            Snapshot::User(s) => (EntityKind::User, &s.id),
            Snapshot::Comment(s) => (EntityKind::Comment, &s.id),
            Snapshot::Notification(s) => (EntityKind::Notification, &s.id),
        }
    }

    /// Put the captured fields back. Returns false when the entity is gone.
    pub(crate) fn restore(self, tables: &mut Tables) -> bool {
        match self {
            Snapshot::Post(s) => restore(tables, s),
            Snapshot::User(s) => restore(tables, s),
            Snapshot::Comment(s) => restore(tables, s),
            Snapshot::Notification(s) => restore(tables, s),
        }
    }
}

fn restore<T: Optimistic>(tables: &mut Tables, snapshot: EntitySnapshot<T>) -> bool {
    match T::table_mut(tables).get_mut(&snapshot.id) {
        Some(entity) => {
            entity.restore(snapshot.fields);
            true
        }
        None => false,
    }
}

/// Server-confirmed entity that replaces the optimistic record.
#[derive(Debug, Clone, PartialEq)]
pub enum Canonical {
    Post(Post),
    User(User),
    Comment(Comment),
    Notification(Notification),
}

impl Canonical {
    pub(crate) fn upsert(self, tables: &mut Tables) {
        match self {
            Canonical::Post(post) => tables.posts.upsert(post),
            Canonical::User(user) => tables.users.upsert(user),
            Canonical::Comment(comment) => tables.comments.upsert(comment),
            Canonical::Notification(notification) => tables.notifications.upsert(notification),
        }
    }
}
