use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::actor_framework::Entity;
use crate::domain::{AlertCreate, StaffId, StockAlert};

/// Custom actions for StockAlert entities.
#[derive(Debug, Clone)]
pub enum AlertAction {
    Resolve { by: StaffId, at: DateTime<Utc> },
}

#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub open_only: bool,
}

impl Entity for StockAlert {
    type Id = String;
    type CreateParams = AlertCreate;
    type Update = ();
    type Action = AlertAction;
    type ActionResult = StockAlert;
    type Filter = AlertFilter;

    const TABLE: &'static str = "stock_alerts";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: AlertCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            product_id: params.product_id,
            alert_type: params.alert_type,
            message: params.message,
            created_at: params.created_at,
            resolved_at: None,
            resolved_by: None,
        })
    }

    fn on_update(&mut self, _update: ()) -> Result<(), String> {
        Ok(())
    }

    /// # Errors
    /// Resolving an alert twice is rejected.
    fn handle_action(&mut self, action: AlertAction) -> Result<StockAlert, String> {
        match action {
            AlertAction::Resolve { by, at } => {
                if !self.is_open() {
                    return Err(format!("Alert {} is already resolved", self.id));
                }
                self.resolved_at = Some(at);
                self.resolved_by = Some(by);
                Ok(self.clone())
            }
        }
    }

    fn matches(&self, filter: &AlertFilter) -> bool {
        !filter.open_only || self.is_open()
    }

    fn list_order(&self, other: &Self) -> Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }
}
