//! REST API client module for the club backend.
//!
//! This module provides the `ApiClient` for issuing list requests, the
//! envelope adapters that normalize each endpoint's response shape, and the
//! `PageFetcher` seam the paged cache is built on.
//!
//! Authentication is owned by the host platform; the client only forwards a
//! bearer token when one is supplied.

pub mod client;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod fetcher;

pub use client::ApiClient;
pub use endpoints::Endpoint;
pub use envelope::{Envelope, RawPage};
pub use error::{ApiError, ErrorKind};
pub use fetcher::{HttpPageFetcher, PageFetcher};
