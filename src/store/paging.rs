//! Fetch lifecycle for paginated lists.
//!
//! Every fetch is stamped with the key's generation when it starts. An
//! initial fetch or a `discard` bumps the generation, so a response that
//! arrives after its key was superseded is dropped without touching the
//! list.

use std::future::Future;

use crate::api::ApiError;
use crate::model::Entity;

use super::{Cached, FetchMode, ListIntent, QueryKey, Store};

/// Proof that a fetch was started; required to apply its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    pub key: QueryKey,
    pub mode: FetchMode,
    pub page: u32,
    pub page_size: u32,
    generation: u64,
}

/// One page as the server sent it.
///
/// `fetched` is the raw record count. It decides whether more pages
/// exist, so records dropped while decoding do not end the list early.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub fetched: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, fetched: usize) -> Self {
        Self { items, fetched }
    }
}

/// A fetch result that can be merged into a list.
pub trait IntoPage {
    type Item: Cached;

    fn into_page(self) -> Page<Self::Item>;
}

impl<T: Cached> IntoPage for Page<T> {
    type Item = T;

    fn into_page(self) -> Page<T> {
        self
    }
}

impl<T: Cached> IntoPage for Vec<T> {
    type Item = T;

    fn into_page(self) -> Page<T> {
        let fetched = self.len();
        Page::new(self, fetched)
    }
}

/// What happened to a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Items merged into the list.
    Applied { received: usize, has_more: bool },
    /// No request was sent: a fetch was already running or the list is
    /// exhausted.
    Suppressed,
    /// The response belonged to a superseded query and was dropped.
    Stale,
}

impl Store {
    /// Mark a fetch as started and hand out its ticket.
    ///
    /// Returns `None` for a next-page request while another fetch for the
    /// key is in flight or after a short page ended the list.
    pub fn begin_fetch(
        &self,
        key: &QueryKey,
        mode: FetchMode,
        page_size: u32,
    ) -> Option<PageTicket> {
        self.update(|inner| {
            let (page, generation) = match mode {
                FetchMode::Initial => (1, inner.bump_generation(key)),
                FetchMode::Next => {
                    let Some(list) = inner.lists.get(key).filter(|l| l.can_load_next()) else {
                        return (None, false);
                    };
                    (list.page + 1, inner.generation(key))
                }
            };
            inner.reduce_list(key, ListIntent::FetchStarted { mode, page_size });
            let ticket = PageTicket {
                key: key.clone(),
                mode,
                page,
                page_size,
                generation,
            };
            (Some(ticket), true)
        })
    }

    /// Merge a fetched page into its list, unless the ticket is stale.
    pub fn complete_fetch<P: IntoPage>(&self, ticket: &PageTicket, page: P) -> PageOutcome {
        let Page { items, fetched } = page.into_page();
        self.update(|inner| {
            if inner.generation(&ticket.key) != ticket.generation {
                return (PageOutcome::Stale, false);
            }

            let received = items.len();
            let ids: Vec<String> = items.iter().map(|item| item.id().to_string()).collect();
            let table = P::Item::table_mut(&mut inner.tables);
            for item in items {
                table.upsert(item);
            }
            inner.reduce_list(
                &ticket.key,
                ListIntent::PageLoaded {
                    mode: ticket.mode,
                    page: ticket.page,
                    ids,
                    fetched,
                },
            );
            let has_more = inner
                .lists
                .get(&ticket.key)
                .map(|list| list.has_more)
                .unwrap_or(false);
            (PageOutcome::Applied { received, has_more }, true)
        })
    }

    /// Record a failed fetch. Returns false when the ticket was stale.
    pub fn fail_fetch(&self, ticket: &PageTicket, error: &str) -> bool {
        self.update(|inner| {
            if inner.generation(&ticket.key) != ticket.generation {
                return (false, false);
            }
            inner.reduce_list(
                &ticket.key,
                ListIntent::FetchFailed {
                    mode: ticket.mode,
                    error: error.to_string(),
                },
            );
            (true, true)
        })
    }
}

/// Run one page fetch for `key` through the ticket lifecycle.
///
/// `fetch` receives `(page, page_size)`. Errors from a superseded fetch
/// are swallowed as [`PageOutcome::Stale`].
pub async fn load_page<P, F, Fut>(
    store: &Store,
    key: QueryKey,
    mode: FetchMode,
    page_size: u32,
    fetch: F,
) -> Result<PageOutcome, ApiError>
where
    P: IntoPage,
    F: FnOnce(u32, u32) -> Fut,
    Fut: Future<Output = Result<P, ApiError>>,
{
    let Some(ticket) = store.begin_fetch(&key, mode, page_size) else {
        tracing::debug!(key = %key, "Next page suppressed");
        return Ok(PageOutcome::Suppressed);
    };

    match fetch(ticket.page, ticket.page_size).await {
        Ok(page) => {
            let outcome = store.complete_fetch(&ticket, page);
            match outcome {
                PageOutcome::Applied { received, has_more } => {
                    tracing::debug!(
                        key = %key,
                        page = ticket.page,
                        received,
                        has_more,
                        "Page applied"
                    );
                }
                _ => tracing::debug!(key = %key, page = ticket.page, "Dropped stale page"),
            }
            Ok(outcome)
        }
        Err(err) => {
            if store.fail_fetch(&ticket, &err.to_string()) {
                tracing::warn!(key = %key, page = ticket.page, error = %err, "Page fetch failed");
                Err(err)
            } else {
                tracing::debug!(key = %key, error = %err, "Ignoring failure of stale fetch");
                Ok(PageOutcome::Stale)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Post;

    fn posts(range: std::ops::Range<u32>) -> Vec<Post> {
        range
            .map(|n| Post {
                id: format!("p{}", n),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_next_requires_loaded_list() {
        let store = Store::new();
        assert!(store.begin_fetch(&QueryKey::Feed, FetchMode::Next, 10).is_none());
    }

    #[test]
    fn test_second_next_suppressed_while_first_in_flight() {
        let store = Store::new();
        let ticket = store.begin_fetch(&QueryKey::Feed, FetchMode::Initial, 2).unwrap();
        store.complete_fetch(&ticket, posts(0..2));

        let first = store.begin_fetch(&QueryKey::Feed, FetchMode::Next, 2);
        assert_eq!(first.as_ref().map(|t| t.page), Some(2));
        assert!(store.begin_fetch(&QueryKey::Feed, FetchMode::Next, 2).is_none());
    }

    #[test]
    fn test_initial_refetch_makes_pending_next_stale() {
        let store = Store::new();
        let ticket = store.begin_fetch(&QueryKey::Feed, FetchMode::Initial, 2).unwrap();
        store.complete_fetch(&ticket, posts(0..2));

        let next = store.begin_fetch(&QueryKey::Feed, FetchMode::Next, 2).unwrap();
        let refresh = store.begin_fetch(&QueryKey::Feed, FetchMode::Initial, 2).unwrap();

        assert_eq!(store.complete_fetch(&next, posts(2..4)), PageOutcome::Stale);
        assert_eq!(
            store.complete_fetch(&refresh, posts(10..11)),
            PageOutcome::Applied {
                received: 1,
                has_more: false
            }
        );
        let list = store.list(&QueryKey::Feed).unwrap();
        assert_eq!(list.ids, vec!["p10".to_string()]);
    }

    #[test]
    fn test_raw_count_decides_has_more() {
        let store = Store::new();
        let ticket = store.begin_fetch(&QueryKey::Feed, FetchMode::Initial, 3).unwrap();
        let outcome = store.complete_fetch(&ticket, Page::new(posts(0..2), 3));
        assert_eq!(
            outcome,
            PageOutcome::Applied {
                received: 2,
                has_more: true
            }
        );
        assert!(store.begin_fetch(&QueryKey::Feed, FetchMode::Next, 3).is_some());
    }

    #[test]
    fn test_stale_failure_is_not_recorded() {
        let store = Store::new();
        let key = QueryKey::Search("a".into());
        let ticket = store.begin_fetch(&key, FetchMode::Initial, 10).unwrap();
        store.discard(&key);
        assert!(!store.fail_fetch(&ticket, "boom"));
        assert!(store.list(&key).is_none());
    }
}
