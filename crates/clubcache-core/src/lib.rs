//! Core library for clubcache.
//!
//! Paginated club lists (join requests, behaviour rules, event guests,
//! referrals) fetched from the club REST API, cached per screen with a TTL,
//! prefetched ahead of the reader, and restored from a session store on
//! back-navigation.
//!
//! - `api`: HTTP client, response envelopes, endpoints, `PageFetcher`
//! - `cache`: `PagedCache`, `CacheEntry`, single-flight guard
//! - `screen`: `ListScreen` state machine and category tabs
//! - `session`: session-scoped snapshot storage
//! - `models`: records and query types
//! - `config`: on-disk configuration

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod screen;
pub mod session;
pub mod utils;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, ApiError, HttpPageFetcher, PageFetcher};
pub use cache::{CachePolicy, PagedCache};
pub use config::Config;
pub use screen::{Intent, ListScreen, ScreenState};
pub use session::{JsonFileSessionStore, MemorySessionStore, SessionStore};
