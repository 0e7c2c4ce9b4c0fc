//! Paged collection cache for a single list screen.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::entry::CacheEntry;
use super::guard::SingleFlight;
use super::policy::CachePolicy;
use crate::api::{ApiError, PageFetcher};
use crate::models::{FilterKey, Filters, PageQuery};

/// Why an entry was cleared. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidateReason {
    FilterChange,
    Expired,
    Manual,
}

impl std::fmt::Display for InvalidateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidateReason::FilterChange => write!(f, "filter-change"),
            InvalidateReason::Expired => write!(f, "ttl"),
            InvalidateReason::Manual => write!(f, "manual"),
        }
    }
}

/// Read-only copy of the cache contents handed to the screen.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: Option<u32>,
    pub filter_key: FilterKey,
    pub scroll_position: f64,
    pub fetched_at: Option<DateTime<Utc>>,
    pub age: String,
}

impl<T> Snapshot<T> {
    pub fn has_more(&self) -> bool {
        matches!(self.total_pages, Some(total) if self.page < total)
    }
}

#[derive(Debug, Clone)]
pub enum EnsureOutcome<T> {
    /// Valid entry served without a request
    Hit(Snapshot<T>),
    /// Page 1 was fetched
    Fetched(Snapshot<T>),
    /// Page 1 is already being fetched by another caller
    InFlight,
    /// The response arrived after the entry was invalidated or the scope closed
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPageOutcome {
    Appended {
        page: u32,
        added: usize,
        from_network: bool,
    },
    /// `page == total_pages`
    Exhausted,
    /// The next page is already being fetched
    InFlight,
    /// Nothing loaded yet; call `ensure_loaded` first
    NotLoaded,
    Discarded,
}

/// What a prefetch pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchReport {
    pub fetched: Vec<u32>,
    pub skipped: Vec<u32>,
    pub failed: Option<u32>,
}

struct State<T> {
    entry: CacheEntry<T>,
    filters: Filters,
    /// Bumped on every invalidation; responses from an older generation are stale
    generation: u64,
    active: bool,
    /// Replaced on every reset, so requests of an older generation never
    /// block pages of the current one
    flights: SingleFlight,
}

struct Inner<F: PageFetcher> {
    scope: String,
    fetcher: F,
    policy: CachePolicy,
    state: Mutex<State<F::Item>>,
    prefetch_task: Mutex<Option<JoinHandle<()>>>,
}

/// Per-screen cache over a [`PageFetcher`].
///
/// Clone is cheap and clones share state; the debounced prefetch task holds
/// one. Locks are never held across a fetch.
pub struct PagedCache<F: PageFetcher> {
    inner: Arc<Inner<F>>,
}

impl<F: PageFetcher> Clone for PagedCache<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: PageFetcher> PagedCache<F> {
    pub fn new(scope: impl Into<String>, fetcher: F, policy: CachePolicy) -> Self {
        let entry = CacheEntry::new(policy.page_size, Filters::new().key());
        Self {
            inner: Arc::new(Inner {
                scope: scope.into(),
                fetcher,
                state: Mutex::new(State {
                    entry,
                    filters: Filters::new(),
                    generation: 0,
                    active: true,
                    flights: SingleFlight::new(),
                }),
                policy,
                prefetch_task: Mutex::new(None),
            }),
        }
    }

    pub fn scope(&self) -> &str {
        &self.inner.scope
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.inner.policy
    }

    /// In-flight pages of the current generation.
    pub fn flights(&self) -> SingleFlight {
        self.state().flights.clone()
    }

    fn state(&self) -> MutexGuard<'_, State<F::Item>> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn snapshot_of(entry: &CacheEntry<F::Item>) -> Snapshot<F::Item> {
        Snapshot {
            items: entry.items(),
            page: entry.page,
            total_pages: entry.total_pages,
            filter_key: entry.filter_key.clone(),
            scroll_position: entry.scroll_position,
            fetched_at: entry.fetched_at,
            age: entry.age_display(),
        }
    }

    pub fn snapshot(&self) -> Snapshot<F::Item> {
        Self::snapshot_of(&self.state().entry)
    }

    /// Copy of the raw entry, including staged pages, for the session store.
    pub fn entry(&self) -> CacheEntry<F::Item> {
        self.state().entry.clone()
    }

    pub fn filters(&self) -> Filters {
        self.state().filters.clone()
    }

    pub fn is_active(&self) -> bool {
        self.state().active
    }

    /// Loaded, not older than `max_age`, and built from `filters`.
    pub fn is_valid(&self, filters: &Filters) -> bool {
        let st = self.state();
        st.entry
            .is_valid(&filters.key(), self.inner.policy.max_age, Utc::now())
    }

    pub fn set_scroll_position(&self, offset: f64) {
        self.state().entry.scroll_position = offset.max(0.0);
    }

    /// Return the cached list for `filters`, fetching page 1 when the entry
    /// is empty, expired, or was built from different filters.
    ///
    /// On failure the entry is left unpopulated so the next call retries.
    pub async fn ensure_loaded(&self, filters: &Filters) -> Result<EnsureOutcome<F::Item>, ApiError> {
        let key = filters.key();
        let (generation, permit) = {
            let mut st = self.state();
            if !st.active {
                return Ok(EnsureOutcome::Discarded);
            }

            let now = Utc::now();
            if st.entry.is_valid(&key, self.inner.policy.max_age, now) && st.entry.item_count() > 0 {
                debug!(scope = %self.inner.scope, filter = %key, "Cache hit");
                return Ok(EnsureOutcome::Hit(Self::snapshot_of(&st.entry)));
            }

            if st.entry.is_loaded() {
                let reason = if st.entry.filter_key != key {
                    InvalidateReason::FilterChange
                } else if st.entry.is_expired(self.inner.policy.max_age, now) {
                    InvalidateReason::Expired
                } else {
                    InvalidateReason::Manual
                };
                self.reset_locked(&mut st, key.clone(), reason);
            } else if st.entry.filter_key != key {
                self.reset_locked(&mut st, key.clone(), InvalidateReason::FilterChange);
            }
            st.filters = filters.clone();

            let Some(permit) = st.flights.permit(1) else {
                debug!(scope = %self.inner.scope, "Page 1 already in flight");
                return Ok(EnsureOutcome::InFlight);
            };
            (st.generation, permit)
        };

        let query = PageQuery::new(1, self.inner.policy.page_size, filters.clone());
        let result = self.inner.fetcher.fetch_page(&query).await;
        drop(permit);

        let mut st = self.state();
        if !st.active || st.generation != generation {
            debug!(scope = %self.inner.scope, page = 1, "Discarding response for stale scope");
            return Ok(EnsureOutcome::Discarded);
        }

        match result {
            Ok(first) => {
                info!(
                    scope = %self.inner.scope,
                    filter = %key,
                    count = first.items.len(),
                    total_pages = first.total_pages,
                    "Loaded first page"
                );
                st.entry.set_first_page(first, Utc::now());
                Ok(EnsureOutcome::Fetched(Self::snapshot_of(&st.entry)))
            }
            Err(e) => {
                error!(scope = %self.inner.scope, filter = %key, error = %e, "Failed to load list");
                Err(e)
            }
        }
    }

    /// Expose the next page, fetching it unless prefetch already did.
    pub async fn load_next_page(&self) -> Result<NextPageOutcome, ApiError> {
        let (target, generation, filters, permit) = {
            let mut st = self.state();
            if !st.active {
                return Ok(NextPageOutcome::Discarded);
            }
            if !st.entry.is_loaded() {
                return Ok(NextPageOutcome::NotLoaded);
            }
            if !st.entry.has_more() {
                return Ok(NextPageOutcome::Exhausted);
            }

            let target = st.entry.page + 1;
            if st.entry.advance_to(target) {
                debug!(scope = %self.inner.scope, page = target, "Serving prefetched page");
                return Ok(NextPageOutcome::Appended {
                    page: target,
                    added: st.entry.page_len(target),
                    from_network: false,
                });
            }
            let Some(permit) = st.flights.permit(target) else {
                debug!(scope = %self.inner.scope, page = target, "Next page already in flight");
                return Ok(NextPageOutcome::InFlight);
            };
            (target, st.generation, st.filters.clone(), permit)
        };

        let query = PageQuery::new(target, self.inner.policy.page_size, filters);
        let result = self.inner.fetcher.fetch_page(&query).await;
        drop(permit);

        let mut st = self.state();
        if !st.active || st.generation != generation {
            debug!(scope = %self.inner.scope, page = target, "Discarding response for stale scope");
            return Ok(NextPageOutcome::Discarded);
        }

        match result {
            Ok(page) => {
                let added = page.items.len();
                st.entry.store_page(target, page);
                st.entry.advance_to(target);
                debug!(scope = %self.inner.scope, page = target, added, "Appended page");
                Ok(NextPageOutcome::Appended {
                    page: target,
                    added,
                    from_network: true,
                })
            }
            Err(e) => {
                warn!(scope = %self.inner.scope, page = target, error = %e, "Failed to load next page");
                Err(e)
            }
        }
    }

    /// Fetch up to `ahead` pages past the current one, one at a time.
    ///
    /// Pages already stored or in flight are skipped. Failures are logged and
    /// end the pass; they never reach the caller.
    pub async fn prefetch(&self, ahead: u32) -> PrefetchReport {
        let mut report = PrefetchReport::default();

        let (start, generation, filters) = {
            let st = self.state();
            if !st.active || !st.entry.is_loaded() {
                return report;
            }
            (st.entry.page, st.generation, st.filters.clone())
        };

        for index in start + 1..=start.saturating_add(ahead) {
            let permit = {
                let st = self.state();
                if !st.active || st.generation != generation {
                    break;
                }
                if index > st.entry.total_pages.unwrap_or(0) {
                    break;
                }
                if st.entry.has_page(index) {
                    report.skipped.push(index);
                    continue;
                }
                st.flights.permit(index)
            };
            let Some(permit) = permit else {
                report.skipped.push(index);
                continue;
            };

            let query = PageQuery::new(index, self.inner.policy.page_size, filters.clone());
            let result = self.inner.fetcher.fetch_page(&query).await;
            drop(permit);

            let mut st = self.state();
            if !st.active || st.generation != generation {
                debug!(scope = %self.inner.scope, page = index, "Discarding prefetch for stale scope");
                break;
            }
            match result {
                Ok(page) => {
                    st.entry.store_page(index, page);
                    report.fetched.push(index);
                }
                Err(e) => {
                    warn!(scope = %self.inner.scope, page = index, error = %e, "Prefetch failed");
                    report.failed = Some(index);
                    break;
                }
            }
        }

        if !report.fetched.is_empty() {
            debug!(scope = %self.inner.scope, pages = ?report.fetched, "Prefetched pages");
        }
        report
    }

    /// Run [`prefetch`](Self::prefetch) after the policy's debounce delay.
    ///
    /// A new call cancels a pending or running pass, so rapid page flips do
    /// not pile up requests. Must be called from within a Tokio runtime.
    pub fn schedule_prefetch(&self) {
        let ahead = self.inner.policy.prefetch_ahead;
        if ahead == 0 || !self.is_active() {
            return;
        }
        let debounce = self.inner.policy.prefetch_debounce;
        let cache = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            cache.prefetch(ahead).await;
        });

        let mut task = self.inner.prefetch_task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = task.replace(handle) {
            previous.abort();
        }
    }

    fn cancel_prefetch(&self) {
        let mut task = self.inner.prefetch_task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }

    fn reset_locked(&self, st: &mut State<F::Item>, key: FilterKey, reason: InvalidateReason) {
        info!(scope = %self.inner.scope, reason = %reason, "Invalidating cache");
        st.entry.reset(key);
        st.generation += 1;
        st.flights = SingleFlight::new();
        self.cancel_prefetch();
    }

    /// Clear the entry. Any response still in flight is discarded on arrival.
    pub fn invalidate(&self, reason: InvalidateReason) {
        let mut st = self.state();
        let key = st.entry.filter_key.clone();
        self.reset_locked(&mut st, key, reason);
    }

    /// Install an entry restored from the session store.
    ///
    /// Ignored when the page size differs from the policy's.
    pub fn restore(&self, filters: Filters, entry: CacheEntry<F::Item>) -> bool {
        if entry.page_size != self.inner.policy.page_size || entry.filter_key != filters.key() {
            debug!(scope = %self.inner.scope, "Ignoring incompatible saved entry");
            return false;
        }
        let mut st = self.state();
        st.entry = entry;
        st.filters = filters;
        st.generation += 1;
        st.flights = SingleFlight::new();
        true
    }

    /// Mark the owning screen as gone. Later completions are discarded.
    pub fn close(&self) {
        self.cancel_prefetch();
        let mut st = self.state();
        st.active = false;
        st.generation += 1;
        debug!(scope = %self.inner.scope, "Cache scope closed");
    }

    #[cfg(test)]
    pub(crate) fn age_by(&self, by: chrono::Duration) {
        let mut st = self.state();
        if let Some(at) = st.entry.fetched_at {
            st.entry.fetched_at = Some(at - by);
        }
    }
}
