//! Mutually exclusive category tabs that drive a list's filter.

use std::collections::HashMap;

use crate::models::{Filters, GuestStatus, JoinRequestStatus, RefDirection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabOption {
    pub label: String,
    /// Filter value; `None` means "All" and omits the parameter
    pub value: Option<String>,
}

impl TabOption {
    pub fn all(label: &str) -> Self {
        Self {
            label: label.to_string(),
            value: None,
        }
    }

    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: Some(value.to_string()),
        }
    }
}

/// Second-tier tabs shown under one primary tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildTabs {
    pub param: String,
    pub options: Vec<TabOption>,
}

/// A primary tab row with optional child rows.
///
/// Selecting a different tab changes the filter; callers must invalidate
/// the list cache and scroll back to the top when `select` or `select_child`
/// returns true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTabs {
    param: String,
    primary: Vec<TabOption>,
    children: HashMap<usize, ChildTabs>,
    selected: usize,
    selected_child: usize,
}

impl CategoryTabs {
    pub fn new(param: &str, primary: Vec<TabOption>) -> Self {
        Self {
            param: param.to_string(),
            primary,
            children: HashMap::new(),
            selected: 0,
            selected_child: 0,
        }
    }

    /// Attach child tabs under the primary tab at `primary_index`.
    pub fn with_children(mut self, primary_index: usize, param: &str, options: Vec<TabOption>) -> Self {
        self.children.insert(
            primary_index,
            ChildTabs {
                param: param.to_string(),
                options,
            },
        );
        self
    }

    pub fn options(&self) -> &[TabOption] {
        &self.primary
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_child(&self) -> usize {
        self.selected_child
    }

    pub fn selected_label(&self) -> &str {
        self.primary
            .get(self.selected)
            .map(|t| t.label.as_str())
            .unwrap_or("")
    }

    /// Child tabs of the selected primary tab, if any.
    pub fn child_tabs(&self) -> Option<&ChildTabs> {
        self.children.get(&self.selected)
    }

    /// Index of the primary tab whose label or value matches `name`.
    pub fn find(&self, name: &str) -> Option<usize> {
        find_option(&self.primary, name)
    }

    /// Same as [`find`](Self::find), over the selected tab's children.
    pub fn find_child(&self, name: &str) -> Option<usize> {
        self.child_tabs().and_then(|c| find_option(&c.options, name))
    }

    /// Returns true when the selection changed.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.primary.len() || index == self.selected {
            return false;
        }
        self.selected = index;
        self.selected_child = 0;
        true
    }

    /// Returns true when the selection changed.
    pub fn select_child(&mut self, index: usize) -> bool {
        let Some(children) = self.children.get(&self.selected) else {
            return false;
        };
        if index >= children.options.len() || index == self.selected_child {
            return false;
        }
        self.selected_child = index;
        true
    }

    /// Write the selected values into `filters`, clearing stale child params.
    pub fn apply(&self, filters: &mut Filters) {
        filters.remove(&self.param);
        for child in self.children.values() {
            filters.remove(&child.param);
        }

        if let Some(value) = self.primary.get(self.selected).and_then(|t| t.value.clone()) {
            filters.set(self.param.clone(), value);
        }
        if let Some(child) = self.child_tabs() {
            if let Some(value) = child
                .options
                .get(self.selected_child)
                .and_then(|t| t.value.clone())
            {
                filters.set(child.param.clone(), value);
            }
        }
    }

    /// Restore a saved selection; out-of-range indices fall back to the first tab.
    pub fn restore(&mut self, selected: usize, selected_child: usize) {
        self.selected = if selected < self.primary.len() { selected } else { 0 };
        let child_len = self.child_tabs().map(|c| c.options.len()).unwrap_or(0);
        self.selected_child = if selected_child < child_len { selected_child } else { 0 };
    }
}

fn find_option(options: &[TabOption], name: &str) -> Option<usize> {
    let name = name.trim();
    options.iter().position(|t| {
        t.label.eq_ignore_ascii_case(name)
            || t.value.as_deref().is_some_and(|v| v.eq_ignore_ascii_case(name))
    })
}

// ============================================================================
// Presets for the club screens
// ============================================================================

/// All / Pending / Approved / Rejected
pub fn join_request_tabs() -> CategoryTabs {
    let status = |s: JoinRequestStatus| s.as_param().unwrap_or_default();
    CategoryTabs::new(
        "status",
        vec![
            TabOption::all("All"),
            TabOption::new("Pending", status(JoinRequestStatus::Pending)),
            TabOption::new("Approved", status(JoinRequestStatus::Approved)),
            TabOption::new("Rejected", status(JoinRequestStatus::Rejected)),
        ],
    )
}

/// Guest status, with a check-in tier under "Confirmed".
pub fn event_guest_tabs() -> CategoryTabs {
    let status = |s: GuestStatus| s.as_param().unwrap_or_default();
    CategoryTabs::new(
        "status",
        vec![
            TabOption::all("All"),
            TabOption::new("Registered", status(GuestStatus::Registered)),
            TabOption::new("Confirmed", status(GuestStatus::Confirmed)),
            TabOption::new("Cancelled", status(GuestStatus::Cancelled)),
        ],
    )
    .with_children(
        2,
        "checkedIn",
        vec![
            TabOption::all("All"),
            TabOption::new("Checked in", "true"),
            TabOption::new("Not checked in", "false"),
        ],
    )
}

/// Given / Received, each with a status tier.
pub fn referral_tabs() -> CategoryTabs {
    let statuses = || {
        vec![
            TabOption::all("All"),
            TabOption::new("New", "new"),
            TabOption::new("In progress", "in_progress"),
            TabOption::new("Closed", "closed"),
        ]
    };
    CategoryTabs::new(
        "type",
        vec![
            TabOption::new("Given", RefDirection::Given.as_param()),
            TabOption::new("Received", RefDirection::Received.as_param()),
        ],
    )
    .with_children(0, "status", statuses())
    .with_children(1, "status", statuses())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterValue;

    #[test]
    fn test_select_changes_filter() {
        let mut tabs = join_request_tabs();
        let mut filters = Filters::new();
        tabs.apply(&mut filters);
        assert!(filters.get("status").is_none());

        assert!(tabs.select(1));
        tabs.apply(&mut filters);
        assert_eq!(filters.get("status"), Some(&FilterValue::Text("pending".to_string())));

        assert!(tabs.select(0));
        tabs.apply(&mut filters);
        assert!(filters.is_empty());
    }

    #[test]
    fn test_select_same_or_out_of_range_is_noop() {
        let mut tabs = join_request_tabs();
        assert!(!tabs.select(0));
        assert!(!tabs.select(9));
        assert_eq!(tabs.selected_label(), "All");
    }

    #[test]
    fn test_child_tabs_follow_primary() {
        let mut tabs = event_guest_tabs();
        assert!(tabs.child_tabs().is_none());
        assert!(!tabs.select_child(1));

        tabs.select(2);
        assert_eq!(tabs.child_tabs().unwrap().param, "checkedIn");
        assert!(tabs.select_child(1));

        let mut filters = Filters::new().with("q", "lan");
        tabs.apply(&mut filters);
        assert_eq!(filters.key().as_str(), "checkedIn=true&q=lan&status=confirmed");

        // Leaving the primary tab drops the child param and selection
        tabs.select(1);
        assert_eq!(tabs.selected_child(), 0);
        tabs.apply(&mut filters);
        assert_eq!(filters.key().as_str(), "q=lan&status=registered");
    }

    #[test]
    fn test_referral_tabs_default_to_given() {
        let tabs = referral_tabs();
        let mut filters = Filters::new();
        tabs.apply(&mut filters);
        assert_eq!(filters.key().as_str(), "type=given");
    }

    #[test]
    fn test_find_by_label_or_value() {
        let mut tabs = referral_tabs();
        assert_eq!(tabs.find("received"), Some(1));
        assert_eq!(tabs.find("Given"), Some(0));
        assert_eq!(tabs.find("sideways"), None);

        tabs.select(1);
        assert_eq!(tabs.find_child("In progress"), Some(2));
        assert_eq!(tabs.find_child("closed"), Some(3));
        assert_eq!(join_request_tabs().find_child("all"), None);
    }

    #[test]
    fn test_restore_clamps_indices() {
        let mut tabs = referral_tabs();
        tabs.restore(1, 2);
        assert_eq!((tabs.selected(), tabs.selected_child()), (1, 2));
        tabs.restore(7, 9);
        assert_eq!((tabs.selected(), tabs.selected_child()), (0, 0));
    }
}
