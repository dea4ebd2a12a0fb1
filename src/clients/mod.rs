//! Typed clients over the generic store actors.

#[macro_use]
mod macros;

mod alert_client;
mod product_client;
mod request_client;

pub use alert_client::AlertClient;
pub use product_client::ProductClient;
pub use request_client::RequestClient;
