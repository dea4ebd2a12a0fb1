//! System orchestration, configuration, startup and shutdown.

pub mod config;
pub mod shelf_system;
pub mod tracing;

pub use config::*;
pub use shelf_system::*;
pub use self::tracing::setup_tracing;
