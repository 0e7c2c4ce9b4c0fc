//! View-model for one paginated list screen.
//!
//! `ListScreen` owns its [`PagedCache`] and runs an explicit state machine
//! (`Idle`, `Loading`, `Loaded`, `Error`) driven by [`Intent`]s. Failures
//! never escape `dispatch`: they become an error state and/or a notice.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::tabs::CategoryTabs;
use crate::api::PageFetcher;
use crate::cache::{CacheEntry, EnsureOutcome, InvalidateReason, NextPageOutcome, PagedCache, Snapshot};
use crate::models::{Filters, ListRecord};
use crate::session::SessionStore;
use crate::utils::contains_ignore_case;

/// Shown when "next page" is requested past the last page.
pub const END_OF_LIST_NOTICE: &str = "You have reached the end of the list";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenState {
    Idle,
    Loading,
    Loaded,
    /// Message for the inline error view
    Error(String),
}

#[derive(Debug, Clone)]
pub enum Intent {
    Mount,
    /// Replace the screen's own filters (search text, event id, ...)
    FilterChanged(Filters),
    SelectTab(usize),
    SelectChildTab(usize),
    NextPage,
    Retry,
    /// Pull-to-refresh
    Refresh,
    Scrolled(f64),
    Unmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient message for the host to show, e.g. as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// What a screen writes to the session store on unmount.
#[derive(Debug, Serialize, Deserialize)]
struct SavedList<T> {
    filters: Filters,
    tab: usize,
    child_tab: usize,
    entry: CacheEntry<T>,
}

pub struct ListScreen<F: PageFetcher> {
    storage_key: String,
    cache: PagedCache<F>,
    base_filters: Filters,
    tabs: Option<CategoryTabs>,
    /// Keep the host's tab selection instead of the saved one on mount
    pin_tabs: bool,
    state: ScreenState,
    notices: Vec<Notice>,
    store: Option<Arc<dyn SessionStore>>,
}

impl<F: PageFetcher> ListScreen<F> {
    /// `storage_key` names this screen in the session store.
    pub fn new(storage_key: impl Into<String>, cache: PagedCache<F>) -> Self {
        Self {
            storage_key: storage_key.into(),
            cache,
            base_filters: Filters::new(),
            tabs: None,
            pin_tabs: false,
            state: ScreenState::Idle,
            notices: Vec::new(),
            store: None,
        }
    }

    pub fn with_tabs(mut self, tabs: CategoryTabs) -> Self {
        self.tabs = Some(tabs);
        self
    }

    /// Like [`with_tabs`](Self::with_tabs), but the current selection wins
    /// over a saved one. A saved list for other tabs is then refetched.
    pub fn with_pinned_tabs(mut self, tabs: CategoryTabs) -> Self {
        self.tabs = Some(tabs);
        self.pin_tabs = true;
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.base_filters = filters;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn cache(&self) -> &PagedCache<F> {
        &self.cache
    }

    pub fn tabs(&self) -> Option<&CategoryTabs> {
        self.tabs.as_ref()
    }

    /// Filters sent to the server: the screen's own plus the selected tabs.
    pub fn filters(&self) -> Filters {
        let mut filters = self.base_filters.clone();
        if let Some(tabs) = &self.tabs {
            tabs.apply(&mut filters);
        }
        filters
    }

    pub fn snapshot(&self) -> Snapshot<F::Item> {
        self.cache.snapshot()
    }

    pub fn items(&self) -> Vec<F::Item> {
        self.cache.snapshot().items
    }

    /// Loaded items whose summary contains `query`, ignoring case.
    pub fn visible_items(&self, query: &str) -> Vec<F::Item> {
        let query = query.trim();
        let items = self.items();
        if query.is_empty() {
            return items;
        }
        items
            .into_iter()
            .filter(|item| contains_ignore_case(&item.summary(), query))
            .collect()
    }

    /// Drain pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub async fn dispatch(&mut self, intent: Intent) -> &ScreenState {
        debug!(screen = %self.storage_key, intent = ?intent, "Dispatch");
        match intent {
            Intent::Mount => {
                self.restore_saved();
                self.load().await;
            }
            Intent::FilterChanged(filters) => {
                if filters != self.base_filters {
                    self.base_filters = filters;
                    self.reload(InvalidateReason::FilterChange).await;
                }
            }
            Intent::SelectTab(index) => {
                let changed = self.tabs.as_mut().map(|t| t.select(index)).unwrap_or(false);
                if changed {
                    self.reload(InvalidateReason::FilterChange).await;
                }
            }
            Intent::SelectChildTab(index) => {
                let changed = self
                    .tabs
                    .as_mut()
                    .map(|t| t.select_child(index))
                    .unwrap_or(false);
                if changed {
                    self.reload(InvalidateReason::FilterChange).await;
                }
            }
            Intent::NextPage => self.next_page().await,
            Intent::Retry => {
                if self.state != ScreenState::Loaded {
                    self.load().await;
                }
            }
            Intent::Refresh => self.reload(InvalidateReason::Manual).await,
            Intent::Scrolled(offset) => self.cache.set_scroll_position(offset),
            Intent::Unmount => {
                self.save();
                self.cache.close();
                self.state = ScreenState::Idle;
            }
        }
        &self.state
    }

    /// Invalidate, then load again if the screen has been mounted.
    async fn reload(&mut self, reason: InvalidateReason) {
        // Also returns the scroll position to the top
        self.cache.invalidate(reason);
        if self.state != ScreenState::Idle {
            self.load().await;
        }
    }

    async fn load(&mut self) {
        let filters = self.filters();
        self.state = ScreenState::Loading;
        match self.cache.ensure_loaded(&filters).await {
            Ok(EnsureOutcome::Hit(_)) | Ok(EnsureOutcome::Fetched(_)) => {
                self.state = ScreenState::Loaded;
                self.cache.schedule_prefetch();
            }
            Ok(EnsureOutcome::InFlight) => {}
            Ok(EnsureOutcome::Discarded) => self.state = ScreenState::Idle,
            Err(e) => {
                warn!(
                    screen = %self.storage_key,
                    kind = ?e.kind(),
                    retryable = e.is_retryable(),
                    "List unavailable"
                );
                let message = e.user_message();
                self.state = ScreenState::Error(message.clone());
                self.notify(NoticeLevel::Error, message);
            }
        }
    }

    async fn next_page(&mut self) {
        if self.state != ScreenState::Loaded {
            return;
        }
        match self.cache.load_next_page().await {
            Ok(NextPageOutcome::Appended { .. }) => self.cache.schedule_prefetch(),
            Ok(NextPageOutcome::Exhausted) => {
                self.notify(NoticeLevel::Info, END_OF_LIST_NOTICE.to_string())
            }
            Ok(NextPageOutcome::InFlight) | Ok(NextPageOutcome::NotLoaded) => {}
            Ok(NextPageOutcome::Discarded) => self.state = ScreenState::Idle,
            // Items already shown stay; the user can try again
            Err(e) => self.notify(NoticeLevel::Error, e.user_message()),
        }
    }

    fn notify(&mut self, level: NoticeLevel, message: String) {
        self.notices.push(Notice { level, message });
    }

    fn restore_saved(&mut self) {
        let Some(store) = self.store.clone() else {
            return;
        };
        let value = match store.load(&self.storage_key) {
            Ok(Some(value)) => value,
            Ok(None) => return,
            Err(e) => {
                warn!(screen = %self.storage_key, error = %e, "Failed to read saved list");
                return;
            }
        };
        let saved: SavedList<F::Item> = match serde_json::from_value(value) {
            Ok(saved) => saved,
            Err(e) => {
                warn!(screen = %self.storage_key, error = %e, "Ignoring unreadable saved list");
                return;
            }
        };

        self.base_filters = saved.filters;
        if let (Some(tabs), false) = (self.tabs.as_mut(), self.pin_tabs) {
            tabs.restore(saved.tab, saved.child_tab);
        }
        if self.cache.restore(self.filters(), saved.entry) {
            debug!(screen = %self.storage_key, "Restored saved list");
        }
    }

    fn save(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let entry = self.cache.entry();
        if !entry.is_loaded() {
            if let Err(e) = store.clear(&self.storage_key) {
                warn!(screen = %self.storage_key, error = %e, "Failed to clear saved list");
            }
            return;
        }

        let (tab, child_tab) = self
            .tabs
            .as_ref()
            .map(|t| (t.selected(), t.selected_child()))
            .unwrap_or((0, 0));
        let saved = SavedList {
            filters: self.base_filters.clone(),
            tab,
            child_tab,
            entry,
        };
        let result = serde_json::to_value(&saved)
            .map_err(anyhow::Error::from)
            .and_then(|value| store.save(&self.storage_key, &value));
        if let Err(e) = result {
            warn!(screen = %self.storage_key, error = %e, "Failed to save list");
        }
    }
}

impl<F: PageFetcher> Drop for ListScreen<F> {
    fn drop(&mut self) {
        self.cache.close();
    }
}
