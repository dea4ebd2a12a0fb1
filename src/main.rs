mod actor_framework;
mod alert_actor;
mod app_system;
mod clients;
mod domain;
mod feed;
mod lifecycle;
mod product_actor;
mod projector;
mod request_actor;
mod storefront;

#[cfg(test)]
mod mock_framework;

use std::time::Duration;

use tracing::{error, info, warn, Instrument};

use crate::app_system::{setup_tracing, ShelfSystem, SystemConfig};
use crate::domain::{ProductCreate, RequestStatus};
use crate::projector::RequestSummary;
use crate::storefront::ProductRequestOutcome;

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = SystemConfig::from_env();
    info!(?config, "Starting smart shelf");
    let system = ShelfSystem::new(config);

    let product_id = system
        .product_client
        .create_product(
            ProductCreate::new("BSH-GSR18", "Cordless Drill GSR 18V", 129.0)
                .brand("Bosch")
                .category("Tools")
                .stock(0, 6),
        )
        .await
        .map_err(|e| e.to_string())?;

    // Customer asks for a warehouse item
    let span = tracing::info_span!("customer_request");
    let tracking = async {
        match system.storefront.handle_product_request(product_id.clone(), "Tools").await {
            Ok(ProductRequestOutcome::Requested(tracking)) => Some(tracking),
            Ok(_) => {
                warn!("Product did not need a request");
                None
            }
            Err(notice) => {
                error!(title = %notice.title, description = %notice.description, "Request failed");
                None
            }
        }
    }
    .instrument(span)
    .await;

    let Some(tracking) = tracking else {
        return system.shutdown().await;
    };

    let mut status = tracking.view.subscribe();
    let customer = tokio::spawn(
        async move {
            loop {
                let projection = crate::projector::project(Some(*status.borrow_and_update()));
                info!(
                    title = projection.title,
                    progress = projection.progress_percent,
                    checks = projection.completed_checks(),
                    "Customer status panel"
                );
                if projection.progress_percent == 100 || status.changed().await.is_err() {
                    break;
                }
            }
        }
        .instrument(tracing::info_span!("customer_view")),
    );

    // Staff works the request from the active list
    let span = tracing::info_span!("staff_dashboard");
    async {
        for target in [RequestStatus::Scanning, RequestStatus::EnRoute, RequestStatus::Delivered] {
            tokio::time::sleep(Duration::from_millis(500)).await;
            match system.feed.refresh().await {
                Ok(snapshot) => {
                    for request in &snapshot.requests {
                        let summary = RequestSummary::from(request);
                        info!(
                            request = %summary.short_id,
                            district = %summary.district,
                            status = %summary.status,
                            next_action = ?summary.next_action,
                            "Active request"
                        );
                    }
                }
                Err(e) => warn!(error = %e, "Feed refresh failed"),
            }
            let notice = system
                .engine
                .handle_staff_action(tracking.request_id, target, "emp_0042")
                .await;
            info!(title = %notice.title, description = %notice.description, "Staff notice");
        }
    }
    .instrument(span)
    .await;

    let _ = customer.await;
    info!(pending = tracking.view.pending_timers(), "Closing customer status view");
    tracking.view.teardown();

    match system.product_client.check_stock(product_id).await {
        Ok((shelf, warehouse)) => info!(shelf, warehouse, "Stock after delivery"),
        Err(e) => error!(error = %e, "Stock check failed"),
    }
    let active = system.feed.refresh().await.map_err(|e| e.to_string())?;
    info!(active = active.requests.len(), "Active requests after delivery");

    system.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}
