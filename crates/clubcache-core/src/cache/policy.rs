use std::time::Duration as StdDuration;

use chrono::Duration;

/// Default number of records per page request.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Consider a cached list stale after 5 minutes.
pub const DEFAULT_MAX_AGE_SECS: i64 = 300;

/// Pages fetched ahead of the visible one.
pub const DEFAULT_PREFETCH_AHEAD: u32 = 2;

/// Delay before a prefetch pass starts, so rapid page flips coalesce.
pub const DEFAULT_PREFETCH_DEBOUNCE_MS: u64 = 300;

/// Tuning for one [`PagedCache`](super::PagedCache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    pub page_size: u32,
    pub max_age: Duration,
    /// 0 disables prefetch
    pub prefetch_ahead: u32,
    pub prefetch_debounce: StdDuration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_age: Duration::seconds(DEFAULT_MAX_AGE_SECS),
            prefetch_ahead: DEFAULT_PREFETCH_AHEAD,
            prefetch_debounce: StdDuration::from_millis(DEFAULT_PREFETCH_DEBOUNCE_MS),
        }
    }
}
