use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Product rejected the operation: {0}")]
    Rejected(String),
    #[error("Product store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Unexpected product store reply: {0}")]
    UnexpectedReply(String),
}

impl From<FrameworkError> for ProductError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            FrameworkError::Rejected(reason) => ProductError::Rejected(reason),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                ProductError::StoreUnavailable(e.to_string())
            }
        }
    }
}
