//! Clubs are stored as loose documents with embedded `members` and
//! `events` arrays, so the model layer carries their vocabulary rather
//! than typed structs.

pub const EVENT_STATUS_PENDING: &str = "pending";
pub const EVENT_STATUS_WAITING: &str = "waiting";
pub const EVENT_STATUS_APPROVED: &str = "approved";
pub const EVENT_STATUS_REJECTED: &str = "rejected";

pub const DEFAULT_CLUB_COLOR: &str = "#ffffff";

/// "waiting" is the legacy spelling of pending review.
pub fn is_pending_event_status(status: &str) -> bool {
    status == EVENT_STATUS_PENDING || status == EVENT_STATUS_WAITING
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiting_counts_as_pending() {
        assert!(is_pending_event_status("pending"));
        assert!(is_pending_event_status("waiting"));
        assert!(!is_pending_event_status("approved"));
        assert!(!is_pending_event_status("rejected"));
    }
}
