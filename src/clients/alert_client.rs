use chrono::Utc;
use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::alert_actor::{AlertAction, AlertError, AlertFilter};
use crate::domain::{AlertCreate, StaffId, StockAlert};

/// Client for the stock alert actor.
#[derive(Clone)]
pub struct AlertClient {
    inner: ResourceClient<StockAlert>,
}

impl_basic_client!(AlertClient, StockAlert, AlertError, alert);

impl AlertClient {
    #[instrument(skip(self), fields(product_id = %params.product_id, alert_type = %params.alert_type))]
    pub async fn raise_alert(&self, params: AlertCreate) -> Result<String, AlertError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(AlertError::from)
    }

    /// Unresolved alerts, newest first.
    #[instrument(skip(self))]
    pub async fn list_open_alerts(&self) -> Result<Vec<StockAlert>, AlertError> {
        debug!("Sending request");
        self.inner
            .list(AlertFilter { open_only: true })
            .await
            .map_err(AlertError::from)
    }

    #[instrument(skip(self))]
    pub async fn resolve_alert(&self, id: String, by: StaffId) -> Result<StockAlert, AlertError> {
        debug!("Sending request");
        let action = AlertAction::Resolve { by, at: Utc::now() };
        self.inner.perform_action(id, action).await.map_err(AlertError::from)
    }
}
