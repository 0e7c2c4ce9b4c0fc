//! Scripted page fetcher for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, PageFetcher};
use crate::models::{ListRecord, Page, PageQuery};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: u32,
    pub page: u32,
    /// Filter key the row was served under
    pub filter: String,
}

impl ListRecord for Row {
    fn record_id(&self) -> String {
        self.id.to_string()
    }

    fn summary(&self) -> String {
        format!("row {} ({})", self.id, self.filter)
    }
}

/// Serves `total_pages` pages of `page_size` rows (the last page may be short)
/// and records every query it receives. Clones share the call log and the
/// failure plan.
#[derive(Clone)]
pub struct ScriptedFetcher {
    total_pages: u32,
    last_page_len: Option<u32>,
    delay: Duration,
    calls: Arc<Mutex<Vec<PageQuery>>>,
    failures: Arc<Mutex<HashMap<u32, ApiError>>>,
}

impl ScriptedFetcher {
    pub fn new(total_pages: u32) -> Self {
        Self {
            total_pages,
            last_page_len: None,
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_last_page_len(mut self, len: u32) -> Self {
        self.last_page_len = Some(len);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail the next request for `page` with `err`.
    pub fn fail_next(&self, page: u32, err: ApiError) {
        self.failures.lock().unwrap().insert(page, err);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.calls.lock().unwrap().iter().map(|q| q.page).collect()
    }

    pub fn calls(&self) -> Vec<PageQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    type Item = Row;

    async fn fetch_page(&self, query: &PageQuery) -> Result<Page<Row>, ApiError> {
        self.calls.lock().unwrap().push(query.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(err) = self.failures.lock().unwrap().remove(&query.page) {
            return Err(err);
        }

        let len = if query.page > self.total_pages {
            0
        } else if query.page == self.total_pages {
            self.last_page_len.unwrap_or(query.page_size)
        } else {
            query.page_size
        };
        let filter = query.filters.key().as_str().to_string();
        let items = (0..len)
            .map(|i| Row {
                id: (query.page - 1) * query.page_size + i + 1,
                page: query.page,
                filter: filter.clone(),
            })
            .collect();

        Ok(Page {
            items,
            total_pages: self.total_pages,
        })
    }
}
