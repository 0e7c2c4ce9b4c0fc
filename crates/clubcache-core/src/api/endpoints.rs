//! List endpoints used by the club screens, each paired with its envelope.

use super::envelope::Envelope;

/// Group join request history (member's own requests).
pub const GROUP_JOIN_HISTORY_PATH: &str = "/group-join-requests/history";

/// Club code-of-conduct reader.
pub const BEHAVIOR_RULES_PATH: &str = "/behavior-rules";

/// Referral ("Ref") exchange.
pub const REFERRALS_PATH: &str = "/refs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Short name for logs and session-store keys
    pub name: &'static str,
    pub path: String,
    pub envelope: Envelope,
}

pub fn group_join_requests() -> Endpoint {
    Endpoint {
        name: "group_join_requests",
        path: GROUP_JOIN_HISTORY_PATH.to_string(),
        envelope: Envelope::SuccessNested,
    }
}

pub fn behavior_rules() -> Endpoint {
    Endpoint {
        name: "behavior_rules",
        path: BEHAVIOR_RULES_PATH.to_string(),
        envelope: Envelope::SuccessItems,
    }
}

pub fn event_guests(event_id: i64) -> Endpoint {
    Endpoint {
        name: "event_guests",
        path: format!("/events/{}/guests", event_id),
        envelope: Envelope::CodeZero,
    }
}

pub fn referrals() -> Endpoint {
    Endpoint {
        name: "referrals",
        path: REFERRALS_PATH.to_string(),
        envelope: Envelope::SuccessItems,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_guests_path() {
        let endpoint = event_guests(42);
        assert_eq!(endpoint.path, "/events/42/guests");
        assert_eq!(endpoint.envelope, Envelope::CodeZero);
    }
}
