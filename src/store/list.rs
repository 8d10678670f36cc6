//! Ordered, paginated id lists and their reducer.

use super::mvi::{Intent, Reducer, ViewState};

/// Whether a fetch replaces the list or extends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Page 1; replaces the list.
    Initial,
    /// The page after the last loaded one; appended.
    Next,
}

/// Ordered result set for one query key.
///
/// Ids point into the store's entity tables. Order is server order; ids
/// are unique within a list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListState {
    pub ids: Vec<String>,
    /// Last page successfully loaded (0 before the first load).
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
    pub loading_initial: bool,
    pub loading_next: bool,
    /// Message from the most recent failed fetch, cleared on the next start.
    pub error: Option<String>,
}

impl ViewState for ListState {}

impl ListState {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading_initial || self.loading_next
    }

    /// True when a next-page request would be issued.
    pub fn can_load_next(&self) -> bool {
        self.has_more && !self.is_loading()
    }
}

/// Events that move a list through its fetch lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListIntent {
    FetchStarted {
        mode: FetchMode,
        page_size: u32,
    },
    /// `fetched` counts the records the server returned, which can exceed
    /// `ids` when some were dropped while decoding.
    PageLoaded {
        mode: FetchMode,
        page: u32,
        ids: Vec<String>,
        fetched: usize,
    },
    FetchFailed {
        mode: FetchMode,
        error: String,
    },
    /// A locally created entity goes to the top.
    Prepended {
        id: String,
    },
    Removed {
        id: String,
    },
}

impl Intent for ListIntent {}

/// Pure state transitions for [`ListState`].
pub struct ListReducer;

impl Reducer for ListReducer {
    type State = ListState;
    type Intent = ListIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ListIntent::FetchStarted { mode, page_size } => match mode {
                FetchMode::Initial => ListState {
                    page_size,
                    loading_initial: true,
                    loading_next: false,
                    error: None,
                    ..state
                },
                FetchMode::Next => ListState {
                    page_size,
                    loading_next: true,
                    error: None,
                    ..state
                },
            },

            ListIntent::PageLoaded {
                mode,
                page,
                ids,
                fetched,
            } => {
                // Short page ends the list; server totals are not trusted.
                let has_more = fetched == state.page_size as usize;
                let merged = match mode {
                    FetchMode::Initial => dedup(ids),
                    FetchMode::Next => {
                        let mut merged = state.ids;
                        for id in ids {
                            if !merged.contains(&id) {
                                merged.push(id);
                            }
                        }
                        merged
                    }
                };
                ListState {
                    ids: merged,
                    page,
                    has_more,
                    loading_initial: false,
                    loading_next: false,
                    error: None,
                    ..state
                }
            }

            ListIntent::FetchFailed { mode, error } => match mode {
                FetchMode::Initial => ListState {
                    loading_initial: false,
                    error: Some(error),
                    ..state
                },
                FetchMode::Next => ListState {
                    loading_next: false,
                    error: Some(error),
                    ..state
                },
            },

            ListIntent::Prepended { id } => {
                let mut ids = state.ids;
                if !ids.contains(&id) {
                    ids.insert(0, id);
                }
                ListState { ids, ..state }
            }

            ListIntent::Removed { id } => {
                let mut ids = state.ids;
                ids.retain(|existing| *existing != id);
                ListState { ids, ..state }
            }
        }
    }
}

fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}
