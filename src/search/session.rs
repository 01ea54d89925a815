// src/search/session.rs
//! Client-side query state: the canonical filter selection, the accumulated
//! result list, and the infinite-scroll feed driven against the executor.
//!
//! All state lives behind one mutex that is never held across an await: a
//! fetch snapshots `(epoch, page, selection)`, runs against the store, then
//! re-locks and commits only if the epoch is unchanged. Every reset bumps the
//! epoch, so a response from a superseded filter state is dropped on arrival
//! instead of being appended to the new list.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::database::{Job, JobStore};
use crate::filters::{FilterDimension, FilterSelection};
use crate::search::debounce::Debouncer;
use crate::search::executor::{JobPage, PageExecutor};

/// Debounce window applied to free-text search input.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Feed lifecycle as the sentinel and fetches drive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    Loading,
    Exhausted,
    Error,
}

/// Render snapshot for the consumer.
#[derive(Debug, Clone)]
pub struct PageView {
    pub items: Vec<Job>,
    pub has_more: bool,
    pub loading: bool,
    pub phase: FeedPhase,
}

struct SessionState {
    selection: FilterSelection,
    visible_query: String,
    items: Vec<Job>,
    next_page: u32,
    has_more: bool,
    phase: FeedPhase,
    in_flight: bool,
    epoch: u64,
}

impl SessionState {
    fn new(selection: FilterSelection) -> Self {
        let visible_query = selection.search.clone();
        Self {
            selection,
            visible_query,
            items: Vec::new(),
            next_page: 1,
            has_more: true,
            phase: FeedPhase::Idle,
            in_flight: false,
            epoch: 0,
        }
    }

    /// Clear the visible list and rearm pagination for a changed selection.
    /// Returns the new epoch; the caller's fetch carries it.
    fn reset_for_refetch(&mut self) -> u64 {
        self.items.clear();
        self.next_page = 1;
        self.has_more = true;
        self.phase = FeedPhase::Loading;
        self.in_flight = true;
        self.epoch += 1;
        self.epoch
    }
}

struct SessionInner {
    executor: PageExecutor,
    debounce: Debouncer,
    state: Mutex<SessionState>,
}

/// One user's search session over the job feed.
#[derive(Clone)]
pub struct SearchSession {
    inner: Arc<SessionInner>,
}

impl SearchSession {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self::with_executor(PageExecutor::new(store), SEARCH_DEBOUNCE)
    }

    pub fn with_executor(executor: PageExecutor, debounce_window: Duration) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                executor,
                debounce: Debouncer::new(debounce_window),
                state: Mutex::new(SessionState::new(FilterSelection::default())),
            }),
        }
    }

    /// Rebuild a session from a previously serialized query string, as on a
    /// page reload.
    pub fn from_query_string(store: Arc<dyn JobStore>, query: &str) -> Self {
        let session = Self::new(store);
        {
            let mut state = session.lock();
            *state = SessionState::new(FilterSelection::parse_query(query));
        }
        session
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().expect("session state lock poisoned")
    }

    /// Discard the current list and fetch page 1 for the current selection.
    pub async fn refresh(&self) {
        let (epoch, selection) = {
            let mut state = self.lock();
            let epoch = state.reset_for_refetch();
            (epoch, state.selection.clone())
        };
        self.run_fetch(epoch, 1, selection).await;
    }

    /// Toggle one filter token and re-run the search from page 1. The list is
    /// cleared before the fetch is issued, so results from the previous
    /// selection are never shown next to results from the new one.
    pub async fn toggle_filter(&self, dimension: FilterDimension, token: &str) {
        let (epoch, selection) = {
            let mut state = self.lock();
            state.selection.toggle(dimension, token);
            let epoch = state.reset_for_refetch();
            (epoch, state.selection.clone())
        };
        self.run_fetch(epoch, 1, selection).await;
    }

    /// Record a keystroke. The visible text updates immediately; the actual
    /// reset-and-refetch fires once the debounce window elapses without
    /// another keystroke.
    pub fn search_input(&self, text: &str) {
        {
            self.lock().visible_query = text.to_string();
        }

        let session = self.clone();
        let text = text.to_string();
        self.inner.debounce.schedule(async move {
            let (epoch, selection) = {
                let mut state = session.lock();
                state.selection.search = text;
                let epoch = state.reset_for_refetch();
                (epoch, state.selection.clone())
            };
            session.run_fetch(epoch, 1, selection).await;
        });
    }

    /// The end-of-list sentinel became visible: request the next page unless
    /// a fetch is already in flight or the feed is drained.
    pub async fn sentinel_visible(&self) {
        let (epoch, page, selection) = {
            let mut state = self.lock();
            if state.in_flight || !state.has_more {
                return;
            }
            state.in_flight = true;
            state.phase = FeedPhase::Loading;
            (state.epoch, state.next_page, state.selection.clone())
        };
        self.run_fetch(epoch, page, selection).await;
    }

    async fn run_fetch(&self, epoch: u64, page: u32, selection: FilterSelection) {
        let fetched: JobPage = self.inner.executor.fetch_page(page, &selection).await;

        let mut state = self.lock();
        if state.epoch != epoch {
            // Superseded while in flight; a newer reset owns the state now.
            return;
        }

        state.in_flight = false;

        if fetched.failed {
            state.phase = FeedPhase::Error;
            state.has_more = false;
            return;
        }

        if page == 1 {
            state.items = fetched.items;
        } else {
            state.items.extend(fetched.items);
        }
        state.next_page = page + 1;
        state.has_more = fetched.has_more;
        state.phase = if fetched.has_more {
            FeedPhase::Idle
        } else {
            FeedPhase::Exhausted
        };
    }

    /// Observable state for rendering.
    pub fn current_page(&self) -> PageView {
        let state = self.lock();
        PageView {
            items: state.items.clone(),
            has_more: state.has_more,
            loading: state.in_flight,
            phase: state.phase,
        }
    }

    /// The selection serialized for the address bar.
    pub fn query_string(&self) -> String {
        self.lock().selection.to_query_string()
    }

    /// The search box contents, which may be ahead of the active selection
    /// while the debounce window is open.
    pub fn visible_query(&self) -> String {
        self.lock().visible_query.clone()
    }

    pub fn selection(&self) -> FilterSelection {
        self.lock().selection.clone()
    }
}
