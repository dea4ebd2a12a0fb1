use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StaffId;

pub const LOW_STOCK_ALERT: &str = "low_stock";

/// A stock problem raised for staff attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAlert {
    pub id: String,
    pub product_id: String,
    pub alert_type: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<StaffId>,
}

impl StockAlert {
    pub fn is_open(&self) -> bool {
        self.resolved_at.is_none()
    }

    /// `low_stock` becomes `LOW STOCK`.
    pub fn headline(&self) -> String {
        self.alert_type.replace('_', " ").to_uppercase()
    }
}

#[derive(Debug, Clone)]
pub struct AlertCreate {
    pub product_id: String,
    pub alert_type: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
