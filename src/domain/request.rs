use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub type RequestId = Uuid;
pub type StaffId = String;

/// Stored lifecycle status of a request.
///
/// The order of the variants is the only legal order of transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[serde(alias = "pending")]
    Requested,
    Scanning,
    EnRoute,
    Delivered,
}

impl RequestStatus {
    pub const ACTIVE: [RequestStatus; 3] = [
        RequestStatus::Requested,
        RequestStatus::Scanning,
        RequestStatus::EnRoute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Requested => "requested",
            RequestStatus::Scanning => "scanning",
            RequestStatus::EnRoute => "en_route",
            RequestStatus::Delivered => "delivered",
        }
    }

    #[allow(dead_code)]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "requested" | "pending" => Some(RequestStatus::Requested),
            "scanning" => Some(RequestStatus::Scanning),
            "en_route" => Some(RequestStatus::EnRoute),
            "delivered" => Some(RequestStatus::Delivered),
            _ => None,
        }
    }

    pub fn successor(&self) -> Option<Self> {
        match self {
            RequestStatus::Requested => Some(RequestStatus::Scanning),
            RequestStatus::Scanning => Some(RequestStatus::EnRoute),
            RequestStatus::EnRoute => Some(RequestStatus::Delivered),
            RequestStatus::Delivered => None,
        }
    }

    pub fn can_advance_to(&self, target: RequestStatus) -> bool {
        self.successor() == Some(target)
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, RequestStatus::Delivered)
    }

    /// Label of the staff button that moves a request out of this status.
    pub fn next_action_label(&self) -> Option<&'static str> {
        match self {
            RequestStatus::Requested => Some("Start Scanning"),
            RequestStatus::Scanning => Some("Mark En Route"),
            RequestStatus::EnRoute => Some("Mark Delivered"),
            RequestStatus::Delivered => None,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move request from {from} to {to}")]
pub struct TransitionError {
    pub from: RequestStatus,
    pub to: RequestStatus,
}

/// A customer ask to bring a warehouse-held product to a location.
///
/// `scanned_at` is set iff the request has reached `scanning`, and
/// `delivered_at` iff it is `delivered`. Both are written once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub product_id: String,
    pub status: RequestStatus,
    pub district: String,
    pub requested_at: DateTime<Utc>,
    pub scanned_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub handled_by: Option<StaffId>,
}

impl Request {
    pub fn new(
        id: RequestId,
        product_id: impl Into<String>,
        district: impl Into<String>,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            product_id: product_id.into(),
            status: RequestStatus::Requested,
            district: district.into(),
            requested_at,
            scanned_at: None,
            delivered_at: None,
            handled_by: None,
        }
    }

    /// First eight characters of the id, as shown on staff cards.
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }

    /// Apply one lifecycle step. Nothing is changed when the step is illegal.
    pub fn advance(
        &mut self,
        to: RequestStatus,
        handled_by: StaffId,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if !self.status.can_advance_to(to) {
            return Err(TransitionError { from: self.status, to });
        }
        match to {
            RequestStatus::Scanning => self.scanned_at = Some(at),
            RequestStatus::Delivered => self.delivered_at = Some(at),
            RequestStatus::Requested | RequestStatus::EnRoute => {}
        }
        self.status = to;
        self.handled_by = Some(handled_by);
        Ok(())
    }
}

/// Parameters for creating a request.
#[derive(Debug, Clone)]
pub struct RequestCreate {
    pub product_id: String,
    pub district: String,
    pub requested_at: DateTime<Utc>,
}

/// Store-side listing filter.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    /// Empty means every status.
    pub statuses: Vec<RequestStatus>,
}

impl RequestFilter {
    pub fn active() -> Self {
        Self {
            statuses: RequestStatus::ACTIVE.to_vec(),
        }
    }
}
