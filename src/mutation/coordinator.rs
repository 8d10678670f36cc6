//! Optimistic mutation coordinator.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::api::ApiError;
use crate::store::{EntityKind, Store};

use super::patch::{Canonical, EntityPatch, Snapshot};

/// How a failed mutation is undone.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Rollback {
    /// Restore the fields captured before the forward patch.
    #[default]
    Snapshot,
    /// Apply these patches instead, to entities that were patched.
    Reverse(Vec<EntityPatch>),
}

/// A user action's optimistic effect and how to undo it.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationIntent {
    /// Short name for logs ("like", "follow", ...).
    pub label: &'static str,
    pub forward: Vec<EntityPatch>,
    pub rollback: Rollback,
}

impl MutationIntent {
    pub fn new(label: &'static str, forward: Vec<EntityPatch>) -> Self {
        Self {
            label,
            forward,
            rollback: Rollback::Snapshot,
        }
    }

    /// Roll back by applying the inverse of every forward patch.
    pub fn reversing(mut self) -> Self {
        self.rollback = Rollback::Reverse(self.forward.iter().map(EntityPatch::reversed).collect());
        self
    }

    fn lock_keys(&self) -> Vec<LockKey> {
        lock_keys(&self.forward)
    }
}

/// Every entity the patches touch, sorted and deduplicated.
fn lock_keys(patches: &[EntityPatch]) -> Vec<LockKey> {
    let mut keys: Vec<LockKey> = patches
        .iter()
        .map(|patch| {
            let (kind, id) = patch.target();
            (kind, id.to_string())
        })
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

type LockKey = (EntityKind, String);

/// Applies intents to the store and settles them against the remote call.
///
/// Mutations touching the same entity run one after another; the second
/// patches on top of the first one's settled state.
#[derive(Clone)]
pub struct Coordinator {
    store: Store,
    locks: Arc<Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>>,
}

impl Coordinator {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Patch, call, then keep, replace or roll back.
    ///
    /// The forward patches land in one store write before `remote` is first
    /// polled. On `Ok(Some(canonical))` the server's record replaces the
    /// optimistic one; on `Err` every patched entity that still exists is
    /// rolled back and the error is returned unchanged.
    pub async fn apply_optimistic<Fut>(
        &self,
        intent: MutationIntent,
        remote: Fut,
    ) -> Result<(), ApiError>
    where
        Fut: Future<Output = Result<Option<Canonical>, ApiError>>,
    {
        let keys = intent.lock_keys();
        let guards = self.acquire(&keys).await;

        let snapshots: Vec<Snapshot> = self.store.write(|inner| {
            intent
                .forward
                .iter()
                .filter_map(|patch| patch.apply(&mut inner.tables))
                .collect()
        });
        tracing::debug!(
            mutation = intent.label,
            patched = snapshots.len(),
            "Applied optimistic patch"
        );

        let result = match remote.await {
            Ok(canonical) => {
                if let Some(canonical) = canonical {
                    self.store.write(|inner| canonical.upsert(&mut inner.tables));
                }
                tracing::debug!(mutation = intent.label, "Mutation confirmed");
                Ok(())
            }
            Err(err) => {
                let restored = self.roll_back(intent.rollback, snapshots);
                tracing::warn!(
                    mutation = intent.label,
                    restored,
                    error = %err,
                    "Mutation failed, rolled back"
                );
                Err(err)
            }
        };

        drop(guards);
        self.prune(&keys);
        result
    }

    /// Apply patches that need no rollback, e.g. counters adjusted after
    /// the server already confirmed the change.
    ///
    /// Waits for any optimistic mutation on the same entities to settle,
    /// so a rollback there cannot erase these changes.
    pub async fn apply_confirmed(&self, patches: &[EntityPatch]) {
        let keys = lock_keys(patches);
        let guards = self.acquire(&keys).await;
        let patched = self.store.write(|inner| {
            patches
                .iter()
                .filter_map(|patch| patch.apply(&mut inner.tables))
                .count()
        });
        drop(guards);
        self.prune(&keys);
        tracing::debug!(patched, "Applied confirmed patch");
    }

    fn roll_back(&self, rollback: Rollback, snapshots: Vec<Snapshot>) -> usize {
        self.store.write(|inner| match rollback {
            Rollback::Snapshot => snapshots
                .into_iter()
                .map(|snapshot| snapshot.restore(&mut inner.tables))
                .filter(|restored| *restored)
                .count(),
            Rollback::Reverse(patches) => {
                let patched: Vec<(EntityKind, &str)> =
                    snapshots.iter().map(Snapshot::target).collect();
                patches
                    .iter()
                    .filter(|patch| patched.contains(&patch.target()))
                    .filter_map(|patch| patch.apply(&mut inner.tables))
                    .count()
            }
        })
    }

    /// Lock every target entity, in sorted order.
    async fn acquire(&self, keys: &[LockKey]) -> Vec<OwnedMutexGuard<()>> {
        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            let lock = {
                let mut locks = self.locks.lock();
                locks.entry(key.clone()).or_default().clone()
            };
            guards.push(lock.lock_owned().await);
        }
        guards
    }

    /// Drop lock entries nobody else is holding or waiting on.
    fn prune(&self, keys: &[LockKey]) {
        let mut locks = self.locks.lock();
        for key in keys {
            if locks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
                locks.remove(key);
            }
        }
    }

    #[cfg(test)]
    fn lock_count(&self) -> usize {
        self.locks.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Post;
    use crate::mutation::PostDelta;

    fn store_with_post(likes: u64, liked: bool) -> Store {
        let store = Store::new();
        store.upsert(Post {
            id: "p1".into(),
            likes_count: likes,
            is_liked: liked,
            ..Default::default()
        });
        store
    }

    fn like_intent() -> MutationIntent {
        MutationIntent::new("like", vec![EntityPatch::post("p1", PostDelta::like(true))])
    }

    #[tokio::test]
    async fn test_success_keeps_forward_state() {
        let store = store_with_post(4, false);
        let coordinator = Coordinator::new(store.clone());

        coordinator
            .apply_optimistic(like_intent(), async { Ok(None) })
            .await
            .unwrap();

        let post = store.post("p1").unwrap();
        assert!(post.is_liked);
        assert_eq!(post.likes_count, 5);
        assert_eq!(coordinator.lock_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_restores_snapshot() {
        let store = store_with_post(4, false);
        let before = store.post("p1").unwrap();
        let coordinator = Coordinator::new(store.clone());

        let result = coordinator
            .apply_optimistic(like_intent(), async {
                Err(ApiError::Status {
                    status: 500,
                    message: "boom".into(),
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.post("p1").unwrap(), before);
    }

    #[tokio::test]
    async fn test_reverse_rollback() {
        let store = store_with_post(4, false);
        let coordinator = Coordinator::new(store.clone());

        let _ = coordinator
            .apply_optimistic(like_intent().reversing(), async {
                Err(ApiError::Unauthorized)
            })
            .await;

        let post = store.post("p1").unwrap();
        assert!(!post.is_liked);
        assert_eq!(post.likes_count, 4);
    }

    #[tokio::test]
    async fn test_canonical_replaces_record() {
        let store = store_with_post(4, false);
        let coordinator = Coordinator::new(store.clone());
        let server = Post {
            id: "p1".into(),
            likes_count: 42,
            is_liked: true,
            ..Default::default()
        };

        coordinator
            .apply_optimistic(like_intent(), async move { Ok(Some(Canonical::Post(server))) })
            .await
            .unwrap();

        assert_eq!(store.post("p1").unwrap().likes_count, 42);
    }

    #[tokio::test]
    async fn test_confirmed_change_survives_concurrent_rollback() {
        let store = store_with_post(4, false);
        let coordinator = Coordinator::new(store.clone());
        let (release, released) = tokio::sync::oneshot::channel::<()>();

        let like = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .apply_optimistic(like_intent(), async move {
                        let _ = released.await;
                        Err(ApiError::Unauthorized)
                    })
                    .await
            })
        };
        while !store.post("p1").unwrap().is_liked {
            tokio::task::yield_now().await;
        }

        let comment = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .apply_confirmed(&[EntityPatch::post("p1", PostDelta::comments(1))])
                    .await
            })
        };
        tokio::task::yield_now().await;
        assert_eq!(store.post("p1").unwrap().comments_count, 0);

        release.send(()).unwrap();
        assert!(like.await.unwrap().is_err());
        comment.await.unwrap();

        let post = store.post("p1").unwrap();
        assert!(!post.is_liked);
        assert_eq!(post.likes_count, 4);
        assert_eq!(post.comments_count, 1);
        assert_eq!(coordinator.lock_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_entity_is_not_an_error() {
        let store = Store::new();
        let coordinator = Coordinator::new(store.clone());
        let result = coordinator
            .apply_optimistic(like_intent(), async { Err(ApiError::Unauthorized) })
            .await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert!(store.post("p1").is_none());
    }
}
