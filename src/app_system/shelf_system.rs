use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::actor_framework::ResourceActor;
use crate::clients::{AlertClient, ProductClient, RequestClient};
use crate::domain::{Product, Request, StockAlert};
use crate::feed::{FeedClient, RequestFeed};
use crate::lifecycle::LifecycleEngine;
use crate::storefront::Storefront;
use super::config::SystemConfig;

/// The application system that orchestrates all actors.
///
/// Starts the stores and the request feed, wires the clients into the
/// lifecycle engine and the storefront, and shuts everything down.
pub struct ShelfSystem {
    pub config: SystemConfig,
    pub request_client: RequestClient,
    pub product_client: ProductClient,
    pub alert_client: AlertClient,
    pub feed: FeedClient,
    pub engine: LifecycleEngine,
    pub storefront: Storefront,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

fn counter_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || format!("{}_{}", prefix, counter.fetch_add(1, Ordering::SeqCst))
}

impl ShelfSystem {
    #[instrument(name = "shelf_system", skip(config))]
    pub fn new(config: SystemConfig) -> Self {
        info!(buffer_size = config.buffer_size, "Starting shelf system");

        // 1. Stores
        let (request_actor, request_resource_client) =
            ResourceActor::<Request>::new(config.buffer_size, Uuid::new_v4);
        let request_client = RequestClient::new(request_resource_client);
        let request_handle = tokio::spawn(request_actor.run());

        let (product_actor, product_resource_client) =
            ResourceActor::<Product>::new(config.buffer_size, counter_ids("product"));
        let product_client = ProductClient::new(product_resource_client);
        let product_handle = tokio::spawn(product_actor.run());

        let (alert_actor, alert_resource_client) =
            ResourceActor::<StockAlert>::new(config.buffer_size, counter_ids("alert"));
        let alert_client = AlertClient::new(alert_resource_client);
        let alert_handle = tokio::spawn(alert_actor.run());

        // 2. Feed, subscribed before anything can be written
        let (feed_actor, feed) = RequestFeed::new(
            config.buffer_size,
            request_client.clone(),
            request_client.subscribe(),
            config.feed_poll_interval,
        );
        let feed_handle = tokio::spawn(feed_actor.run());

        // 3. Orchestration
        let engine = LifecycleEngine::new(
            request_client.clone(),
            product_client.clone(),
            alert_client.clone(),
            config.low_stock_threshold,
        );
        let storefront = Storefront::new(product_client.clone(), request_client.clone(), config.simulation);

        Self {
            config,
            request_client,
            product_client,
            alert_client,
            feed,
            engine,
            storefront,
            handles: vec![request_handle, product_handle, alert_handle, feed_handle],
        }
    }

    /// Stops the feed, then closes the stores by dropping every client.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down shelf system...");
        // The feed holds a request client; stop it first so the store can close.
        if let Err(e) = self.feed.shutdown().await {
            error!(error = %e, "Request feed already stopped");
        }

        drop(self.storefront);
        drop(self.engine);
        drop(self.feed);
        drop(self.request_client);
        drop(self.product_client);
        drop(self.alert_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
