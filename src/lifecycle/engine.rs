use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::clients::{AlertClient, ProductClient, RequestClient};
use crate::domain::{AlertCreate, Request, RequestId, RequestStatus, StockStatus, LOW_STOCK_ALERT};
use crate::request_actor::RequestError;
use super::notice::Notice;

/// Drives requests through `requested → scanning → en_route → delivered`
/// on behalf of staff.
#[derive(Clone)]
pub struct LifecycleEngine {
    requests: RequestClient,
    products: ProductClient,
    alerts: AlertClient,
    low_stock_threshold: u32,
}

impl LifecycleEngine {
    pub fn new(
        requests: RequestClient,
        products: ProductClient,
        alerts: AlertClient,
        low_stock_threshold: u32,
    ) -> Self {
        Self {
            requests,
            products,
            alerts,
            low_stock_threshold,
        }
    }

    /// Move a request to `to`, which must be the immediate successor of its
    /// current status.
    ///
    /// A delivered transition is followed by exactly one shelf stock
    /// decrement. The decrement is not atomic with the status write: when it
    /// fails the transition stays recorded and the failure is only logged.
    #[instrument(skip(self), fields(request_id = %id, target = %to))]
    pub async fn advance(
        &self,
        id: RequestId,
        to: RequestStatus,
        staff: &str,
    ) -> Result<Request, RequestError> {
        let current = self
            .requests
            .get_request(id)
            .await?
            .ok_or_else(|| RequestError::NotFound(id.to_string()))?;

        if !current.status.can_advance_to(to) {
            warn!(from = %current.status, "Rejected out-of-order transition");
            return Err(RequestError::InvalidTransition {
                from: current.status,
                to,
            });
        }

        let updated = self
            .requests
            .advance_request(id, to, staff.to_string(), Utc::now())
            .await
            .map_err(|e| {
                warn!(error = %e, "Store refused transition");
                e
            })?;
        info!(status = %updated.status, "Request advanced");

        if updated.status == RequestStatus::Delivered {
            self.apply_delivery_side_effects(&updated).await;
        }
        Ok(updated)
    }

    /// Staff action boundary: every outcome becomes a notice, nothing propagates.
    #[instrument(skip(self), fields(request_id = %id, target = %to))]
    pub async fn handle_staff_action(&self, id: RequestId, to: RequestStatus, staff: &str) -> Notice {
        match self.advance(id, to, staff).await {
            Ok(request) => Notice::success(
                "Request Updated",
                format!("Request status updated to {}", request.status),
            ),
            Err(e) => {
                error!(error = %e, "Staff action failed");
                Notice::failure(e.user_message())
            }
        }
    }

    async fn apply_delivery_side_effects(&self, request: &Request) {
        let product = match self.products.decrement_shelf_stock(request.product_id.clone()).await {
            Ok(product) => product,
            Err(e) => {
                // Known gap: status and stock may now disagree until someone fixes stock by hand.
                error!(
                    request_id = %request.id,
                    product_id = %request.product_id,
                    error = %e,
                    "StockSideEffectFailure: shelf stock not decremented"
                );
                return;
            }
        };
        info!(product_id = %product.id, shelf_stock = product.shelf_stock, "Shelf stock decremented");

        if product.stock_status(self.low_stock_threshold) == StockStatus::InStock {
            return;
        }
        if let Err(e) = self.raise_low_stock_alert(&product.id, product.total_stock()).await {
            error!(product_id = %product.id, error = %e, "Failed to raise low stock alert");
        }
    }

    async fn raise_low_stock_alert(
        &self,
        product_id: &str,
        total_stock: u32,
    ) -> Result<(), crate::alert_actor::AlertError> {
        let open = self.alerts.list_open_alerts().await?;
        if open
            .iter()
            .any(|a| a.product_id == product_id && a.alert_type == LOW_STOCK_ALERT)
        {
            return Ok(());
        }
        let alert_id = self
            .alerts
            .raise_alert(AlertCreate {
                product_id: product_id.to_string(),
                alert_type: LOW_STOCK_ALERT.to_string(),
                message: format!("Only {} left in store", total_stock),
                created_at: Utc::now(),
            })
            .await?;
        info!(alert_id = %alert_id, product_id, "Low stock alert raised");
        Ok(())
    }
}
