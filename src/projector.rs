//! Status projection: what the customer status panel and staff summaries
//! show for a given request status.
//!
//! [`project`] is pure and total. Unknown labels fall back to a neutral
//! "Processing" projection instead of failing.

use serde::Serialize;

use crate::domain::{Request, RequestStatus};

/// Status as seen by the customer.
///
/// `Arriving` is never stored. It is the late phase of `en_route`, reached
/// by elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Requested,
    Scanning,
    EnRoute,
    Arriving,
}

impl DisplayStatus {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "requested" | "pending" => Some(DisplayStatus::Requested),
            "scanning" => Some(DisplayStatus::Scanning),
            "en_route" => Some(DisplayStatus::EnRoute),
            "arriving" => Some(DisplayStatus::Arriving),
            _ => None,
        }
    }

    fn rank(&self) -> usize {
        match self {
            DisplayStatus::Requested => 1,
            DisplayStatus::Scanning => 2,
            DisplayStatus::EnRoute => 3,
            DisplayStatus::Arriving => 4,
        }
    }
}

impl From<RequestStatus> for DisplayStatus {
    /// A delivered request has passed every customer-visible step.
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Requested => DisplayStatus::Requested,
            RequestStatus::Scanning => DisplayStatus::Scanning,
            RequestStatus::EnRoute => DisplayStatus::EnRoute,
            RequestStatus::Delivered => DisplayStatus::Arriving,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconKind {
    Package,
    Staff,
    Location,
    Arrived,
    Clock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineCheck {
    pub label: &'static str,
    pub completed: bool,
}

pub const TIMELINE_LABELS: [&str; 4] = [
    "Request received",
    "Item scanned by staff",
    "Staff en route to customer",
    "Arriving at location",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusProjection {
    pub title: &'static str,
    pub message: &'static str,
    pub icon: IconKind,
    pub progress_percent: u8,
    pub timeline: [TimelineCheck; 4],
    pub eta: Option<&'static str>,
}

impl StatusProjection {
    pub fn completed_checks(&self) -> usize {
        self.timeline.iter().filter(|check| check.completed).count()
    }
}

/// Project a display status; `None` yields the fallback projection.
pub fn project(status: Option<DisplayStatus>) -> StatusProjection {
    let (title, message, icon, progress_percent, eta) = match status {
        Some(DisplayStatus::Requested) => (
            "Request Sent",
            "We received your request and are processing it...",
            IconKind::Package,
            25,
            None,
        ),
        Some(DisplayStatus::Scanning) => (
            "Item Located",
            "Staff member is collecting your item from warehouse",
            IconKind::Staff,
            50,
            None,
        ),
        Some(DisplayStatus::EnRoute) => (
            "On the Way",
            "Staff member is heading to your location",
            IconKind::Location,
            75,
            Some("3-5 minutes"),
        ),
        Some(DisplayStatus::Arriving) => (
            "Almost Here!",
            "Staff member will arrive in 1-2 minutes",
            IconKind::Arrived,
            100,
            Some("1-2 minutes"),
        ),
        None => ("Processing", "Please wait...", IconKind::Clock, 0, None),
    };

    let reached = status.map_or(0, |s| s.rank());
    let timeline = std::array::from_fn(|i| TimelineCheck {
        label: TIMELINE_LABELS[i],
        completed: i < reached,
    });

    StatusProjection {
        title,
        message,
        icon,
        progress_percent,
        timeline,
        eta,
    }
}

/// Project a raw status label as received from the store.
#[allow(dead_code)]
pub fn project_label(label: &str) -> StatusProjection {
    project(DisplayStatus::parse(label))
}

/// One row of the staff active-requests panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSummary {
    pub short_id: String,
    pub district: String,
    pub status: RequestStatus,
    pub next_action: Option<&'static str>,
    pub projection: StatusProjection,
}

impl From<&Request> for RequestSummary {
    fn from(request: &Request) -> Self {
        Self {
            short_id: request.short_id(),
            district: request.district.clone(),
            status: request.status,
            next_action: request.status.next_action_label(),
            projection: project(Some(request.status.into())),
        }
    }
}
