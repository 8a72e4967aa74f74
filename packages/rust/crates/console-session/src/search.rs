//! Priority-split search.
//!
//! A query change is echoed to subscribers at once with `pending = true`;
//! results are recomputed on a background task. A newer request aborts the
//! older task and bumps the generation, and a task only publishes while its
//! generation is still current, so results for a stale query never reach
//! subscribers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use console_store::{ConsoleState, SearchState, SearchView};
use console_types::MessageId;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::observability::SessionEvent;

/// What search subscribers see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSnapshot {
    /// Query, results, selection and visibility of the search bar.
    pub view: SearchView,
    /// Results are being recomputed for `view.query`.
    pub pending: bool,
    /// Request generation the snapshot belongs to.
    pub generation: u64,
}

struct SearchInner {
    search: SearchState,
    requested: String,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

struct SearchShared {
    inner: Mutex<SearchInner>,
    view: watch::Sender<SearchSnapshot>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Search front-end shared by a session and its background tasks.
#[derive(Clone)]
pub struct SearchController {
    shared: Arc<SearchShared>,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchController {
    /// Idle controller with an empty query.
    #[must_use]
    pub fn new() -> Self {
        let (view, _) = watch::channel(SearchSnapshot::default());
        Self {
            shared: Arc::new(SearchShared {
                inner: Mutex::new(SearchInner {
                    search: SearchState::default(),
                    requested: String::new(),
                    generation: 0,
                    task: None,
                }),
                view,
            }),
        }
    }

    /// Echo `query` now and recompute results against `state` in the background.
    pub fn search(&self, query: &str, state: ConsoleState) {
        tracing::debug!(
            event = SessionEvent::SearchRequested.as_str(),
            query,
            "search requested"
        );
        self.schedule(Some(query), state);
    }

    /// Recompute the current query after the visible set changed.
    ///
    /// A no-op while no query has been entered.
    pub fn refresh(&self, state: ConsoleState) {
        if lock(&self.shared.inner).requested.is_empty() {
            return;
        }
        self.schedule(None, state);
    }

    fn schedule(&self, query: Option<&str>, state: ConsoleState) {
        let mut inner = lock(&self.shared.inner);
        if let Some(query) = query {
            inner.requested = query.to_string();
        }
        inner.generation += 1;
        let generation = inner.generation;
        if let Some(previous) = inner.task.take() {
            if !previous.is_finished() {
                tracing::debug!(
                    event = SessionEvent::SearchSuperseded.as_str(),
                    generation,
                    "superseded search recompute aborted"
                );
            }
            previous.abort();
        }
        let requested = inner.requested.clone();
        self.shared.view.send_modify(|snapshot| {
            snapshot.view.query.clone_from(&requested);
            snapshot.pending = true;
            snapshot.generation = generation;
        });

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let shared = Arc::clone(&self.shared);
                inner.task = Some(runtime.spawn(async move {
                    // Let the echo reach subscribers before the heavy part.
                    tokio::task::yield_now().await;
                    Self::recompute(&shared, generation, &requested, &state);
                }));
            }
            Err(_) => {
                drop(inner);
                Self::recompute(&self.shared, generation, &requested, &state);
            }
        }
    }

    fn recompute(shared: &SearchShared, generation: u64, query: &str, state: &ConsoleState) {
        let mut work = {
            let inner = lock(&shared.inner);
            if inner.generation != generation {
                return;
            }
            inner.search.clone()
        };
        work.search(query, state);

        let mut inner = lock(&shared.inner);
        if inner.generation != generation {
            return;
        }
        inner.search.adopt(work);
        inner.task = None;
        let view = inner.search.view();
        tracing::debug!(
            event = SessionEvent::SearchPublished.as_str(),
            generation,
            results = view.results.len(),
            index = ?view.index,
            "search results published"
        );
        shared.view.send_replace(SearchSnapshot {
            view,
            pending: false,
            generation,
        });
    }

    fn update(&self, f: impl FnOnce(&mut SearchState) -> Option<MessageId>) -> Option<MessageId> {
        let mut inner = lock(&self.shared.inner);
        let selected = f(&mut inner.search);
        let view = inner.search.view();
        self.shared.view.send_modify(|snapshot| {
            snapshot.view.results = view.results;
            snapshot.view.index = view.index;
            snapshot.view.shown = view.shown;
        });
        selected
    }

    /// Select the next result.
    pub fn go_to_next(&self) -> Option<MessageId> {
        self.update(SearchState::go_to_next)
    }

    /// Select the previous result.
    pub fn go_to_previous(&self) -> Option<MessageId> {
        self.update(SearchState::go_to_previous)
    }

    /// Open the search bar.
    pub fn show(&self) {
        self.update(|search| {
            search.show();
            None
        });
    }

    /// Close the search bar.
    pub fn hide(&self) {
        self.update(|search| {
            search.hide();
            None
        });
    }

    /// Abort background work and forget the query.
    pub fn reset(&self) {
        let mut inner = lock(&self.shared.inner);
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        inner.generation += 1;
        inner.requested.clear();
        inner.search = SearchState::default();
        let generation = inner.generation;
        self.shared.view.send_replace(SearchSnapshot {
            generation,
            ..SearchSnapshot::default()
        });
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn current(&self) -> SearchSnapshot {
        self.shared.view.borrow().clone()
    }

    /// Subscribe to snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.shared.view.subscribe()
    }

    /// Wait until no recompute is pending.
    pub async fn settled(&self) -> SearchSnapshot {
        let mut receiver = self.subscribe();
        match receiver.wait_for(|snapshot| !snapshot.pending).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.current(),
        }
    }
}
