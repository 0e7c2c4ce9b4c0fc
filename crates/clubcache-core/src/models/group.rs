use serde::{Deserialize, Serialize};

use super::ListRecord;
use crate::utils::format_date;

/// Review state of a request to join a club group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Rejected,
    Unknown,
}

impl JoinRequestStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "waiting" | "0" => JoinRequestStatus::Pending,
            "approved" | "accepted" | "1" => JoinRequestStatus::Approved,
            "rejected" | "declined" | "2" => JoinRequestStatus::Rejected,
            _ => JoinRequestStatus::Unknown,
        }
    }

    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            JoinRequestStatus::Pending => Some("pending"),
            JoinRequestStatus::Approved => Some("approved"),
            JoinRequestStatus::Rejected => Some("rejected"),
            JoinRequestStatus::Unknown => None,
        }
    }
}

impl std::fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinRequestStatus::Pending => write!(f, "Pending"),
            JoinRequestStatus::Approved => write!(f, "Approved"),
            JoinRequestStatus::Rejected => write!(f, "Rejected"),
            JoinRequestStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: i64,
    #[serde(rename = "groupId")]
    pub group_id: i64,
    #[serde(rename = "groupName", default)]
    pub group_name: Option<String>,
    #[serde(rename = "status", default, deserialize_with = "super::text_or_number")]
    pub status_text: Option<String>,
    #[serde(rename = "createdAt", alias = "requestedAt", default)]
    pub requested_at: Option<String>,
    #[serde(rename = "reviewedAt", default)]
    pub reviewed_at: Option<String>,
    #[serde(rename = "rejectReason", alias = "note", default)]
    pub note: Option<String>,
}

impl JoinRequest {
    pub fn status(&self) -> JoinRequestStatus {
        self.status_text
            .as_deref()
            .map(JoinRequestStatus::parse)
            .unwrap_or(JoinRequestStatus::Unknown)
    }

    pub fn group_display(&self) -> String {
        self.group_name
            .clone()
            .unwrap_or_else(|| format!("Group #{}", self.group_id))
    }
}

impl ListRecord for JoinRequest {
    fn record_id(&self) -> String {
        self.id.to_string()
    }

    fn summary(&self) -> String {
        let date = self
            .requested_at
            .as_deref()
            .map(format_date)
            .unwrap_or_else(|| "-".to_string());
        let mut line = format!("{} | {} | {}", self.group_display(), self.status(), date);
        if let Some(note) = self.note.as_deref().filter(|n| !n.is_empty()) {
            line.push_str(" | ");
            line.push_str(note);
        }
        line
    }
}
