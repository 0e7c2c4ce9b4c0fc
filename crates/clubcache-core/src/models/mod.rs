//! Data models for club list screens.
//!
//! - `Filters`, `FilterKey`, `PageQuery`, `Page`: paging and filter types
//! - `JoinRequest`: group join request history
//! - `BehaviorRule`: club code-of-conduct entries
//! - `EventGuest`: event guest lists
//! - `Referral`: referral ("Ref") exchange between members

pub mod event;
pub mod group;
pub mod page;
pub mod referral;
pub mod rules;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

pub use event::{EventGuest, GuestStatus};
pub use group::{JoinRequest, JoinRequestStatus};
pub use page::{FilterKey, FilterValue, Filters, Page, PageQuery};
pub use referral::{RefDirection, RefStatus, Referral};
pub use rules::BehaviorRule;

/// A record that can be held in a paged list cache and shown in a list.
pub trait ListRecord: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Stable identifier, used for logging and lookups.
    fn record_id(&self) -> String;

    /// One-line rendering for list rows and client-side search.
    fn summary(&self) -> String;
}

/// Scalar the server sends as either a string or a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Int(i64),
    Float(f64),
}

/// Deserialize an optional status-like field given as text or a numeric code.
pub(crate) fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TextOrNumber>::deserialize(deserializer)?.map(|v| match v {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Int(n) => n.to_string(),
        TextOrNumber::Float(n) => n.to_string(),
    }))
}
