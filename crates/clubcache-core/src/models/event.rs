use serde::{Deserialize, Serialize};

use super::ListRecord;
use crate::utils::format_phone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestStatus {
    Registered,
    Confirmed,
    Cancelled,
    Unknown,
}

impl GuestStatus {
    /// Query parameter value used by the guest list endpoint.
    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            GuestStatus::Registered => Some("registered"),
            GuestStatus::Confirmed => Some("confirmed"),
            GuestStatus::Cancelled => Some("cancelled"),
            GuestStatus::Unknown => None,
        }
    }
}

impl std::fmt::Display for GuestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuestStatus::Registered => write!(f, "Registered"),
            GuestStatus::Confirmed => write!(f, "Confirmed"),
            GuestStatus::Cancelled => write!(f, "Cancelled"),
            GuestStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventGuest {
    #[serde(alias = "guestId")]
    pub id: i64,
    #[serde(rename = "fullName", alias = "name")]
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(rename = "memberId", default)]
    pub member_id: Option<i64>,
    // "status" on newer payloads, "registrationStatus" on older ones
    #[serde(
        rename = "status",
        alias = "registrationStatus",
        default,
        deserialize_with = "super::text_or_number"
    )]
    pub status_text: Option<String>,
    #[serde(rename = "checkedIn", default)]
    pub checked_in: bool,
    #[serde(rename = "invitedBy", default)]
    pub invited_by: Option<String>,
}

impl EventGuest {
    pub fn status(&self) -> GuestStatus {
        match self.status_text.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("registered") | Some("pending") | Some("0") => GuestStatus::Registered,
            Some("confirmed") | Some("approved") | Some("going") | Some("1") => GuestStatus::Confirmed,
            Some("cancelled") | Some("canceled") | Some("rejected") | Some("2") => GuestStatus::Cancelled,
            _ => GuestStatus::Unknown,
        }
    }

    /// Guests invited by a member rather than registered directly.
    pub fn is_invited(&self) -> bool {
        self.member_id.is_none() && self.invited_by.is_some()
    }
}

impl ListRecord for EventGuest {
    fn record_id(&self) -> String {
        self.id.to_string()
    }

    fn summary(&self) -> String {
        let phone = self
            .phone
            .as_deref()
            .map(format_phone)
            .unwrap_or_else(|| "-".to_string());
        let check = if self.checked_in { "checked in" } else { "not checked in" };
        format!("{} | {} | {} | {}", self.full_name, phone, self.status(), check)
    }
}
