//! Request store logic: lifecycle transitions and active listings.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
