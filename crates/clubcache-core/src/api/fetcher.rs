//! Page fetchers: one normalized page per call.

use std::marker::PhantomData;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::endpoints::Endpoint;
use super::{ApiClient, ApiError};
use crate::models::{ListRecord, Page, PageQuery};

/// Fetches a single page of a server-paginated collection.
///
/// Implementations issue exactly one request per call and keep no memory of
/// earlier calls; caching is the caller's concern.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    type Item: ListRecord;

    async fn fetch_page(&self, query: &PageQuery) -> Result<Page<Self::Item>, ApiError>;
}

/// [`PageFetcher`] backed by the REST API and an endpoint's envelope adapter.
pub struct HttpPageFetcher<T> {
    client: ApiClient,
    endpoint: Endpoint,
    _record: PhantomData<fn() -> T>,
}

impl<T> HttpPageFetcher<T> {
    pub fn new(client: ApiClient, endpoint: Endpoint) -> Self {
        Self {
            client,
            endpoint,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T: ListRecord> PageFetcher for HttpPageFetcher<T> {
    type Item = T;

    async fn fetch_page(&self, query: &PageQuery) -> Result<Page<T>, ApiError> {
        let body = self
            .client
            .get_json(&self.endpoint.path, &query.to_query_pairs())
            .await
            .inspect_err(|e| {
                warn!(endpoint = self.endpoint.name, page = query.page, error = %e, "Page request failed")
            })?;

        let raw = self.endpoint.envelope.normalize(body, query.page_size)?;
        let items = decode_items(raw.items)?;

        debug!(
            endpoint = self.endpoint.name,
            page = query.page,
            count = items.len(),
            total_pages = raw.total_pages,
            "Fetched page"
        );

        Ok(Page {
            items,
            total_pages: raw.total_pages,
        })
    }
}

/// Decode raw JSON records, reporting the first record that does not fit.
pub fn decode_items<T: ListRecord>(raw: Vec<serde_json::Value>) -> Result<Vec<T>, ApiError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::from_value(value)
                .map_err(|e| ApiError::InvalidResponse(format!("record {}: {}", i, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BehaviorRule;
    use serde_json::json;

    #[test]
    fn test_decode_items() {
        let raw = vec![
            json!({"id": 1, "title": "Be kind", "order": 1}),
            json!({"id": 2, "title": "Be early", "order": 2}),
        ];
        let rules: Vec<BehaviorRule> = decode_items(raw).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].title, "Be early");
    }

    #[test]
    fn test_decode_items_reports_bad_record() {
        let raw = vec![json!({"id": 1, "title": "ok"}), json!({"id": "x"})];
        let err = decode_items::<BehaviorRule>(raw).unwrap_err();
        match err {
            ApiError::InvalidResponse(msg) => assert!(msg.starts_with("record 1:")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
