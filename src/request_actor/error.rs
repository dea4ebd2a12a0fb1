use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{RequestStatus, TransitionError};

/// Errors that can occur during request operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RequestError {
    #[error("Request not found: {0}")]
    NotFound(String),
    #[error("Invalid transition: cannot move request from {from} to {to}")]
    InvalidTransition { from: RequestStatus, to: RequestStatus },
    #[error("Request validation error: {0}")]
    Validation(String),
    #[error("Request store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Malformed change notification: {0}")]
    MalformedNotification(String),
}

impl RequestError {
    /// Copy shown to the person whose action failed.
    pub fn user_message(&self) -> String {
        match self {
            RequestError::NotFound(_) => "This request no longer exists.".to_string(),
            RequestError::InvalidTransition { from, to } => {
                format!("A {} request cannot be marked {}.", from, to)
            }
            RequestError::Validation(reason) => format!("The request was rejected: {}.", reason),
            RequestError::StoreUnavailable(_) | RequestError::MalformedNotification(_) => {
                "Failed to update request status. Please try again.".to_string()
            }
        }
    }
}

impl From<FrameworkError> for RequestError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => RequestError::NotFound(id),
            FrameworkError::Rejected(reason) => RequestError::Validation(reason),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                RequestError::StoreUnavailable(e.to_string())
            }
        }
    }
}

impl From<TransitionError> for RequestError {
    fn from(e: TransitionError) -> Self {
        RequestError::InvalidTransition { from: e.from, to: e.to }
    }
}
