//! Product-specific store logic, including shelf stock actions.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
