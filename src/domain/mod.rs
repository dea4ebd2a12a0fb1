//! Store records, free of actor plumbing.

pub mod alert;
pub mod product;
pub mod request;

pub use alert::*;
pub use product::*;
pub use request::*;
