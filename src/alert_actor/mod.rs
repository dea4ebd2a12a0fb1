//! Stock alerts raised for staff and resolved by them.

pub mod entity;
pub mod error;

pub use entity::{AlertAction, AlertFilter};
pub use error::*;
