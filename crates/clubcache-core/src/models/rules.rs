use serde::{Deserialize, Serialize};

use super::ListRecord;
use crate::utils::truncate_string;

/// Maximum characters of rule content shown in a list row.
const SUMMARY_CONTENT_CHARS: usize = 60;

/// One entry of the club's code of conduct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorRule {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "sortOrder", alias = "order", default)]
    pub sort_order: i64,
    #[serde(default)]
    pub category: Option<String>,
}

impl ListRecord for BehaviorRule {
    fn record_id(&self) -> String {
        self.id.to_string()
    }

    fn summary(&self) -> String {
        // Content is stored as HTML in some payloads
        let plain = strip_tags(&self.content);
        format!(
            "{}. {} - {}",
            self.sort_order,
            self.title,
            truncate_string(plain.trim(), SUMMARY_CONTENT_CHARS)
        )
    }
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_strips_html() {
        let rule: BehaviorRule = serde_json::from_str(
            r#"{"id": 1, "title": "Punctuality", "content": "<p>Arrive <b>on time</b></p>", "order": 2}"#,
        )
        .unwrap();
        assert_eq!(rule.summary(), "2. Punctuality - Arrive on time");
    }

    #[test]
    fn test_summary_truncates_long_content() {
        let rule = BehaviorRule {
            id: 1,
            title: "Respect".to_string(),
            content: "a".repeat(100),
            sort_order: 1,
            category: None,
        };
        assert!(rule.summary().ends_with("..."));
    }
}
