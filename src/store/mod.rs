//! Normalized entity cache.
//!
//! Every entity lives exactly once in its table, keyed by id. Lists hold
//! ids only, so a patch to a post is visible in the feed, the profile grid
//! and the detail view at once.
//!
//! The [`Store`] handle is cheap to clone. Writers take the lock briefly
//! and bump a revision counter; views watch the counter with
//! [`Store::subscribe`] and re-read whatever they render.

mod key;
mod list;
pub mod mvi;
mod paging;
mod table;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::model::{Comment, Entity, Follow, Notification, Post, User};

pub use key::{EntityKind, QueryKey};
pub use list::{FetchMode, ListIntent, ListReducer, ListState};
pub use paging::{load_page, IntoPage, Page, PageOutcome, PageTicket};
pub use table::EntityTable;

use mvi::Reducer;

/// The entity tables, one per kind.
#[derive(Debug, Default)]
pub struct Tables {
    pub posts: EntityTable<Post>,
    pub users: EntityTable<User>,
    pub comments: EntityTable<Comment>,
    pub notifications: EntityTable<Notification>,
    pub follows: EntityTable<Follow>,
}

impl Tables {
    fn clear(&mut self) {
        self.posts.clear();
        self.users.clear();
        self.comments.clear();
        self.notifications.clear();
        self.follows.clear();
    }
}

/// Maps an entity type to its table.
pub trait Cached: Entity + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn table(tables: &Tables) -> &EntityTable<Self>;
    fn table_mut(tables: &mut Tables) -> &mut EntityTable<Self>;
}

macro_rules! cached {
    ($ty:ty, $kind:ident, $field:ident) => {
        impl Cached for $ty {
            const KIND: EntityKind = EntityKind::$kind;

            fn table(tables: &Tables) -> &EntityTable<Self> {
                &tables.$field
            }

            fn table_mut(tables: &mut Tables) -> &mut EntityTable<Self> {
                &mut tables.$field
            }
        }
    };
}

cached!(Post, Post, posts);
cached!(User, User, users);
cached!(Comment, Comment, comments);
cached!(Notification, Notification, notifications);
cached!(Follow, Follow, follows);

/// Everything behind the store lock.
#[derive(Debug, Default)]
pub struct StoreInner {
    pub tables: Tables,
    pub(crate) lists: HashMap<QueryKey, ListState>,
    /// Survives `discard` so late responses for a dropped key stay stale.
    pub(crate) generations: HashMap<QueryKey, u64>,
}

impl StoreInner {
    pub(crate) fn bump_generation(&mut self, key: &QueryKey) -> u64 {
        let generation = self.generations.entry(key.clone()).or_insert(0);
        *generation += 1;
        *generation
    }

    pub(crate) fn generation(&self, key: &QueryKey) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }

    fn reduce_list(&mut self, key: &QueryKey, intent: ListIntent) {
        let state = self.lists.remove(key).unwrap_or_default();
        self.lists.insert(key.clone(), ListReducer::reduce(state, intent));
    }

    /// Drop an id from every list of the given kind.
    fn remove_from_lists(&mut self, kind: EntityKind, id: &str) {
        for (key, state) in self.lists.iter_mut() {
            if key.kind() == kind && state.contains(id) {
                let current = std::mem::take(state);
                *state = ListReducer::reduce(current, ListIntent::Removed { id: id.to_string() });
            }
        }
    }
}

/// Shared handle to the normalized cache.
#[derive(Clone)]
pub struct Store {
    inner: Arc<RwLock<StoreInner>>,
    revision: Arc<watch::Sender<u64>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(StoreInner::default())),
            revision: Arc::new(revision),
        }
    }

    /// Receiver that changes whenever the cache is written.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision; increases by one per write.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&StoreInner) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` under the write lock and notify watchers once.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut StoreInner) -> R) -> R {
        self.update(|inner| (f(inner), true))
    }

    /// Like `write`, but `f` decides whether anything changed.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut StoreInner) -> (R, bool)) -> R {
        let (result, changed) = {
            let mut inner = self.inner.write();
            f(&mut inner)
        };
        if changed {
            self.revision.send_modify(|revision| *revision += 1);
        }
        result
    }

    pub fn get<T: Cached>(&self, id: &str) -> Option<T> {
        self.read(|inner| T::table(&inner.tables).get(id).cloned())
    }

    pub fn post(&self, id: &str) -> Option<Post> {
        self.get(id)
    }

    pub fn user(&self, id: &str) -> Option<User> {
        self.get(id)
    }

    pub fn comment(&self, id: &str) -> Option<Comment> {
        self.get(id)
    }

    pub fn notification(&self, id: &str) -> Option<Notification> {
        self.get(id)
    }

    /// Snapshot of a list's paging state.
    pub fn list(&self, key: &QueryKey) -> Option<ListState> {
        self.read(|inner| inner.lists.get(key).cloned())
    }

    /// The list's entities in list order. Ids whose record has been
    /// removed are skipped.
    pub fn items<T: Cached>(&self, key: &QueryKey) -> Vec<T> {
        self.read(|inner| {
            let table = T::table(&inner.tables);
            inner
                .lists
                .get(key)
                .map(|list| {
                    list.ids
                        .iter()
                        .filter_map(|id| table.get(id).cloned())
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// Insert or replace one entity.
    pub fn upsert<T: Cached>(&self, entity: T) {
        self.write(|inner| T::table_mut(&mut inner.tables).upsert(entity));
    }

    pub fn upsert_many<T: Cached>(&self, entities: impl IntoIterator<Item = T>) {
        self.write(|inner| {
            let table = T::table_mut(&mut inner.tables);
            for entity in entities {
                table.upsert(entity);
            }
        });
    }

    /// Remove an entity from its table and from every list holding it.
    pub fn remove<T: Cached>(&self, id: &str) -> Option<T> {
        self.update(|inner| {
            let removed = T::table_mut(&mut inner.tables).remove(id);
            inner.remove_from_lists(T::KIND, id);
            let changed = removed.is_some();
            (removed, changed)
        })
    }

    /// Upsert an entity and put its id at the top of `key`'s list.
    pub fn prepend<T: Cached>(&self, key: &QueryKey, entity: T) {
        self.write(|inner| {
            let id = entity.id().to_string();
            T::table_mut(&mut inner.tables).upsert(entity);
            inner.reduce_list(key, ListIntent::Prepended { id });
        });
    }

    /// Drop an id from one list, leaving the record in place.
    pub fn remove_from_list(&self, key: &QueryKey, id: &str) {
        self.update(|inner| match inner.lists.get(key) {
            Some(list) if list.contains(id) => {
                inner.reduce_list(key, ListIntent::Removed { id: id.to_string() });
                ((), true)
            }
            _ => ((), false),
        });
    }

    /// Forget a list. Any fetch still in flight for it becomes stale.
    pub fn discard(&self, key: &QueryKey) {
        self.write(|inner| {
            inner.bump_generation(key);
            inner.lists.remove(key);
        });
        tracing::debug!(key = %key, "Discarded cached list");
    }

    /// Clear every table and list, e.g. on sign-out.
    pub fn reset(&self) {
        self.write(|inner| {
            let keys: Vec<QueryKey> = inner.lists.keys().cloned().collect();
            for key in &keys {
                inner.bump_generation(key);
            }
            inner.lists.clear();
            inner.tables.clear();
        });
        tracing::info!("Cache cleared");
    }
}
