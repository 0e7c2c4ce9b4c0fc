//! HTTP client for the club REST API.
//!
//! This module provides the `ApiClient` struct for making list requests
//! with an optional bearer token supplied by the host platform.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow mobile networks while failing fast enough for good UX.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the club backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Issue exactly one GET and return the decoded JSON body.
    ///
    /// No retries happen here; retry policy belongs to the caller.
    pub async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        let url = self.url(path);

        let mut request = self.client.get(&url).query(query);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        debug!(url = %url, status = %response.status(), "GET response");

        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("https://api.example.vn/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "https://api.example.vn/v1");
        assert_eq!(client.url("/behavior-rules"), "https://api.example.vn/v1/behavior-rules");
        assert_eq!(client.url("refs"), "https://api.example.vn/v1/refs");
    }

    #[test]
    fn test_set_token_keeps_base_url() {
        let mut client = ApiClient::new("https://api.example.vn", Duration::from_secs(5)).unwrap();
        assert!(client.token.is_none());
        client.set_token("abc".to_string());
        assert_eq!(client.base_url(), "https://api.example.vn");
        assert_eq!(client.token.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        // Port 9 on localhost has nothing listening in test environments
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.get_json("/refs", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::NetworkError(_) | ApiError::Timeout));
    }
}
