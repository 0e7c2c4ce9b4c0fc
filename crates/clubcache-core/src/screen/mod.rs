//! List screens: the state machine a host UI drives, plus category tabs.
//!
//! - `ListScreen`: mount / filter / next-page / retry / refresh / unmount
//! - `CategoryTabs`: primary and child tabs mapped onto filter parameters

pub mod list;
pub mod tabs;

pub use list::{Intent, ListScreen, Notice, NoticeLevel, ScreenState, END_OF_LIST_NOTICE};
pub use tabs::{
    event_guest_tabs, join_request_tabs, referral_tabs, CategoryTabs, ChildTabs, TabOption,
};
