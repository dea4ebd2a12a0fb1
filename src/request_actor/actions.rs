use chrono::{DateTime, Utc};

use crate::domain::{Request, RequestStatus, StaffId, TransitionError};

/// Custom actions for Request entities.
#[derive(Debug, Clone)]
pub enum RequestAction {
    /// Moves the request one step along its lifecycle.
    ///
    /// The store checks `to` against its own copy, so of two racing
    /// attempts only the first can succeed.
    Advance {
        to: RequestStatus,
        handled_by: StaffId,
        at: DateTime<Utc>,
    },
}

/// Results from RequestActions - variants match 1:1 with RequestAction
#[derive(Debug, Clone)]
pub enum RequestActionResult {
    Advance(Result<Request, TransitionError>),
}
