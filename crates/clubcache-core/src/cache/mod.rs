//! Client-side caching for paginated lists.
//!
//! This module provides the `PagedCache` that a list screen uses to avoid
//! refetching when the user comes back with unchanged filters, and to fetch
//! upcoming pages ahead of time.
//!
//! - `CacheEntry`: pages of one filtered list, with TTL and scroll position
//! - `SingleFlight`: at most one request per page index
//! - `PagedCache`: ensure-loaded / next-page / prefetch / invalidate
//!
//! Lists are considered stale after 5 minutes by default.

pub mod entry;
pub mod guard;
pub mod paged;
pub mod policy;

pub use entry::CacheEntry;
pub use guard::{FlightPermit, SingleFlight};
pub use paged::{
    EnsureOutcome, InvalidateReason, NextPageOutcome, PagedCache, PrefetchReport, Snapshot,
};
pub use policy::CachePolicy;
