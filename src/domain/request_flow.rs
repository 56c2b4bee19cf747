//! Allowed edges of the request lifecycle.
//!
//! ```text
//! draft -> submitted -> approved -> ready_for_pickup -> handed_over -> returned -> closed
//!                   \-> rejected -> closed     \--------^          \-> overdue -> returned | closed
//! ```

use serde::Serialize;

use super::RequestStatus;

/// A named action on a request, used for audit entries and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Create,
    Submit,
    Approve,
    Reject,
    MarkReady,
    Handover,
    Return,
    MarkOverdue,
    Close,
}

impl Transition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::MarkReady => "mark_ready",
            Self::Handover => "handover",
            Self::Return => "return",
            Self::MarkOverdue => "mark_overdue",
            Self::Close => "close",
        }
    }
}

impl RequestStatus {
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        use RequestStatus::{
            Approved, Closed, Draft, HandedOver, Overdue, ReadyForPickup, Rejected, Returned,
            Submitted,
        };

        matches!(
            (self, next),
            (Draft, Submitted)
                | (Submitted, Approved | Rejected)
                | (Approved, ReadyForPickup | HandedOver)
                | (ReadyForPickup, HandedOver)
                | (HandedOver, Returned | Overdue)
                | (Overdue, Returned | Closed)
                | (Returned | Rejected, Closed)
        )
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_happy_path() {
        let path = [
            RequestStatus::Draft,
            RequestStatus::Submitted,
            RequestStatus::Approved,
            RequestStatus::ReadyForPickup,
            RequestStatus::HandedOver,
            RequestStatus::Returned,
            RequestStatus::Closed,
        ];
        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_closed_is_terminal() {
        assert!(RequestStatus::Closed.is_terminal());
        for next in RequestStatus::iter() {
            assert!(!RequestStatus::Closed.can_transition_to(next));
        }
    }

    #[test]
    fn test_no_going_back() {
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Submitted));
        assert!(!RequestStatus::Returned.can_transition_to(RequestStatus::HandedOver));
        assert!(!RequestStatus::Rejected.can_transition_to(RequestStatus::Approved));
        assert!(!RequestStatus::Submitted.can_transition_to(RequestStatus::HandedOver));
    }

    #[test]
    fn test_overdue_paths() {
        assert!(RequestStatus::HandedOver.can_transition_to(RequestStatus::Overdue));
        assert!(RequestStatus::Overdue.can_transition_to(RequestStatus::Returned));
        assert!(RequestStatus::Overdue.can_transition_to(RequestStatus::Closed));
        assert!(!RequestStatus::Returned.can_transition_to(RequestStatus::Overdue));
    }

    #[test]
    fn test_immediate_pickup_skips_ready() {
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::HandedOver));
    }
}
