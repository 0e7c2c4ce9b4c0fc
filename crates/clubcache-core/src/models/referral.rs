use serde::{Deserialize, Serialize};

use super::ListRecord;
use crate::utils::format_date;

/// Direction of a referral ("Ref") relative to the signed-in member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefDirection {
    Given,
    Received,
}

impl RefDirection {
    pub fn as_param(&self) -> &'static str {
        match self {
            RefDirection::Given => "given",
            RefDirection::Received => "received",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefStatus {
    New,
    InProgress,
    Closed,
    Unknown,
}

impl RefStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "new" | "sent" => RefStatus::New,
            "in_progress" | "contacted" => RefStatus::InProgress,
            "closed" | "done" | "completed" => RefStatus::Closed,
            _ => RefStatus::Unknown,
        }
    }
}

impl std::fmt::Display for RefStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefStatus::New => write!(f, "New"),
            RefStatus::InProgress => write!(f, "In progress"),
            RefStatus::Closed => write!(f, "Closed"),
            RefStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A business referral exchanged between two members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub id: i64,
    #[serde(rename = "fromMemberName", alias = "giverName", default)]
    pub from_member: Option<String>,
    #[serde(rename = "toMemberName", alias = "receiverName", default)]
    pub to_member: Option<String>,
    #[serde(rename = "contactName", default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Estimated deal value in VND
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(rename = "status", default, deserialize_with = "super::text_or_number")]
    pub status_text: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

impl Referral {
    pub fn status(&self) -> RefStatus {
        self.status_text
            .as_deref()
            .map(RefStatus::parse)
            .unwrap_or(RefStatus::Unknown)
    }

    pub fn value_display(&self) -> String {
        match self.value {
            Some(v) => format!("{} VND", group_thousands(v)),
            None => "-".to_string(),
        }
    }
}

fn group_thousands(v: i64) -> String {
    let digits = v.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    if v < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

impl ListRecord for Referral {
    fn record_id(&self) -> String {
        self.id.to_string()
    }

    fn summary(&self) -> String {
        let from = self.from_member.as_deref().unwrap_or("?");
        let to = self.to_member.as_deref().unwrap_or("?");
        let date = self
            .created_at
            .as_deref()
            .map(format_date)
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} -> {} | {} | {} | {} | {}",
            from,
            to,
            self.contact_name.as_deref().unwrap_or("-"),
            self.value_display(),
            self.status(),
            date
        )
    }
}
