//! Request lifecycle: staff-driven transitions and the customer-side
//! simulated progression.

pub mod engine;
pub mod notice;
pub mod simulation;

pub use engine::LifecycleEngine;
pub use notice::Notice;
pub use simulation::StatusView;
