use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{FilterKey, Page};
use crate::utils::age_display;

/// Cached pages of one filtered list.
///
/// Pages are stored by index, so the visible `items` are always in page
/// order no matter in which order responses arrived. `page` counts the
/// contiguous pages exposed to the screen; pages fetched ahead of it by
/// prefetch are held back until `load_next_page` reaches them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pages: BTreeMap<u32, Vec<T>>,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: Option<u32>,
    pub filter_key: FilterKey,
    pub scroll_position: f64,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T: Clone> CacheEntry<T> {
    pub fn new(page_size: u32, filter_key: FilterKey) -> Self {
        Self {
            pages: BTreeMap::new(),
            page: 1,
            page_size: page_size.max(1),
            total_pages: None,
            filter_key,
            scroll_position: 0.0,
            fetched_at: None,
        }
    }

    /// Items of pages `1..=page`, in page order.
    pub fn items(&self) -> Vec<T> {
        if self.fetched_at.is_none() {
            return Vec::new();
        }
        self.pages
            .range(1..=self.page)
            .flat_map(|(_, items)| items.iter().cloned())
            .collect()
    }

    pub fn item_count(&self) -> usize {
        if self.fetched_at.is_none() {
            return 0;
        }
        self.pages.range(1..=self.page).map(|(_, items)| items.len()).sum()
    }

    pub fn is_loaded(&self) -> bool {
        self.fetched_at.is_some()
    }

    pub fn has_page(&self, page: u32) -> bool {
        self.pages.contains_key(&page)
    }

    /// Pages held beyond `page`, waiting to be exposed.
    pub fn staged_pages(&self) -> Vec<u32> {
        self.pages.range(self.page + 1..).map(|(p, _)| *p).collect()
    }

    pub fn has_more(&self) -> bool {
        matches!(self.total_pages, Some(total) if self.page < total)
    }

    pub fn is_expired(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        match self.fetched_at {
            Some(at) => now - at > max_age,
            None => true,
        }
    }

    /// Loaded, fresh, and produced by `filter_key`.
    pub fn is_valid(&self, filter_key: &FilterKey, max_age: Duration, now: DateTime<Utc>) -> bool {
        self.fetched_at.is_some() && !self.is_expired(max_age, now) && &self.filter_key == filter_key
    }

    /// Drop all pages and return to the empty state.
    pub fn reset(&mut self, filter_key: FilterKey) {
        self.pages.clear();
        self.page = 1;
        self.total_pages = None;
        self.filter_key = filter_key;
        self.scroll_position = 0.0;
        self.fetched_at = None;
    }

    /// Replace the entry contents with a freshly fetched first page.
    pub fn set_first_page(&mut self, first: Page<T>, now: DateTime<Utc>) {
        self.pages.clear();
        self.pages.insert(1, first.items);
        self.page = 1;
        // An empty collection still has one (empty) page
        self.total_pages = Some(first.total_pages.max(1));
        self.fetched_at = Some(now);
    }

    /// Store page `index` without exposing it.
    pub fn store_page(&mut self, index: u32, page: Page<T>) {
        self.pages.insert(index, page.items);
        self.update_total(page.total_pages);
    }

    /// Expose `index` if it is the next contiguous page and is stored.
    pub fn advance_to(&mut self, index: u32) -> bool {
        if index == self.page + 1 && self.pages.contains_key(&index) && index <= self.total_pages.unwrap_or(0) {
            self.page = index;
            true
        } else {
            false
        }
    }

    pub fn page_len(&self, index: u32) -> usize {
        self.pages.get(&index).map(Vec::len).unwrap_or(0)
    }

    fn update_total(&mut self, reported: u32) {
        let total = reported.max(1);
        self.total_pages = Some(total);
        if self.page > total {
            // The collection shrank under us
            self.page = total;
        }
        self.pages.retain(|p, _| *p <= total);
    }

    pub fn age_minutes(&self) -> Option<i64> {
        self.fetched_at.map(|at| (Utc::now() - at).num_minutes())
    }

    pub fn age_display(&self) -> String {
        match self.age_minutes() {
            Some(minutes) => age_display(minutes),
            None => "never".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Filters;

    fn page(items: Vec<u32>, total_pages: u32) -> Page<u32> {
        Page { items, total_pages }
    }

    fn key(status: &str) -> FilterKey {
        Filters::new().with("status", status).key()
    }

    #[test]
    fn test_new_entry_is_empty_and_invalid() {
        let entry: CacheEntry<u32> = CacheEntry::new(10, key("pending"));
        assert!(entry.items().is_empty());
        assert_eq!(entry.page, 1);
        assert!(!entry.is_loaded());
        assert!(!entry.is_valid(&key("pending"), Duration::minutes(5), Utc::now()));
        assert_eq!(entry.age_display(), "never");
    }

    #[test]
    fn test_is_valid_checks_age_and_filter() {
        let mut entry = CacheEntry::new(10, key("pending"));
        entry.set_first_page(page(vec![1, 2], 3), Utc::now());
        let max_age = Duration::minutes(5);

        assert!(entry.is_valid(&key("pending"), max_age, Utc::now()));
        assert!(!entry.is_valid(&key("approved"), max_age, Utc::now()));

        entry.fetched_at = Some(Utc::now() - Duration::minutes(6));
        assert!(!entry.is_valid(&key("pending"), max_age, Utc::now()));
        assert!(entry.is_expired(max_age, Utc::now()));
    }

    #[test]
    fn test_items_in_page_order_regardless_of_arrival() {
        let mut entry = CacheEntry::new(2, key("all"));
        entry.set_first_page(page(vec![1, 2], 3), Utc::now());
        // Page 3 arrives before page 2
        entry.store_page(3, page(vec![5, 6], 3));
        entry.store_page(2, page(vec![3, 4], 3));

        assert_eq!(entry.items(), vec![1, 2]);
        assert_eq!(entry.staged_pages(), vec![2, 3]);

        assert!(!entry.advance_to(3));
        assert!(entry.advance_to(2));
        assert!(entry.advance_to(3));
        assert_eq!(entry.items(), vec![1, 2, 3, 4, 5, 6]);
        assert!(!entry.has_more());
    }

    #[test]
    fn test_page_never_exceeds_total() {
        let mut entry = CacheEntry::new(2, key("all"));
        entry.set_first_page(page(vec![1, 2], 3), Utc::now());
        entry.store_page(2, page(vec![3, 4], 3));
        assert!(entry.advance_to(2));

        // Server now reports a single page
        entry.store_page(3, page(vec![], 1));
        assert_eq!(entry.total_pages, Some(1));
        assert_eq!(entry.page, 1);
        assert!(!entry.has_page(2));
        assert!(!entry.has_page(3));
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let mut entry: CacheEntry<u32> = CacheEntry::new(10, key("all"));
        entry.set_first_page(page(vec![], 0), Utc::now());
        assert_eq!(entry.total_pages, Some(1));
        assert!(!entry.has_more());
        assert_eq!(entry.item_count(), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut entry = CacheEntry::new(2, key("pending"));
        entry.set_first_page(page(vec![1, 2], 2), Utc::now());
        entry.scroll_position = 240.0;
        entry.reset(key("approved"));

        assert!(entry.items().is_empty());
        assert_eq!(entry.page, 1);
        assert_eq!(entry.total_pages, None);
        assert_eq!(entry.fetched_at, None);
        assert_eq!(entry.scroll_position, 0.0);
        assert_eq!(entry.filter_key, key("approved"));
    }

    #[test]
    fn test_age_display_fresh() {
        let mut entry = CacheEntry::new(2, key("all"));
        entry.set_first_page(page(vec![1], 1), Utc::now());
        assert_eq!(entry.age_display(), "just now");
        entry.fetched_at = Some(Utc::now() - Duration::minutes(90));
        assert_eq!(entry.age_display(), "1h ago");
    }
}
