use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Offsets from request creation at which the customer view advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationSchedule {
    pub scanning: Duration,
    pub en_route: Duration,
    pub arriving: Duration,
}

impl Default for SimulationSchedule {
    fn default() -> Self {
        Self {
            scanning: Duration::from_secs(2),
            en_route: Duration::from_secs(5),
            arriving: Duration::from_secs(8),
        }
    }
}

/// Runtime settings for the whole system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    /// Mailbox size of every actor.
    pub buffer_size: usize,
    pub simulation: SimulationSchedule,
    /// A product whose total stock is below this is low on stock.
    pub low_stock_threshold: u32,
    /// Extra polling on top of change notifications; `None` disables it.
    pub feed_poll_interval: Option<Duration>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            simulation: SimulationSchedule::default(),
            low_stock_threshold: 5,
            feed_poll_interval: None,
        }
    }
}

impl SystemConfig {
    /// Defaults overridden by `SHELF_BUFFER_SIZE`, `SHELF_LOW_STOCK_THRESHOLD`
    /// and `SHELF_FEED_POLL_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(size) = parse_var::<usize>(&lookup, "SHELF_BUFFER_SIZE") {
            if size == 0 {
                warn!("SHELF_BUFFER_SIZE must be positive, keeping default");
            } else {
                config.buffer_size = size;
            }
        }
        if let Some(threshold) = parse_var::<u32>(&lookup, "SHELF_LOW_STOCK_THRESHOLD") {
            config.low_stock_threshold = threshold;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "SHELF_FEED_POLL_SECS") {
            config.feed_poll_interval = (secs > 0).then(|| Duration::from_secs(secs));
        }
        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable setting");
            None
        }
    }
}
