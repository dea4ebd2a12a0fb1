use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during stock alert operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AlertError {
    #[error("Alert not found: {0}")]
    NotFound(String),
    #[error("Alert rejected the operation: {0}")]
    Rejected(String),
    #[error("Alert store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<FrameworkError> for AlertError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => AlertError::NotFound(id),
            FrameworkError::Rejected(reason) => AlertError::Rejected(reason),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                AlertError::StoreUnavailable(e.to_string())
            }
        }
    }
}
