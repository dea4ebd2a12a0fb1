//! Customer flow: product search and asking for an item to be brought over.

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::app_system::SimulationSchedule;
use crate::clients::{ProductClient, RequestClient};
use crate::domain::{Availability, Product, RequestCreate, RequestId};
use crate::lifecycle::{Notice, StatusView};
use crate::product_actor::ProductError;
use crate::request_actor::RequestError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorefrontError {
    #[error("Unknown product: {0}")]
    UnknownProduct(String),
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error(transparent)]
    Request(#[from] RequestError),
}

impl StorefrontError {
    pub fn user_message(&self) -> String {
        match self {
            StorefrontError::UnknownProduct(_) => "This product is no longer listed.".to_string(),
            StorefrontError::Product(_) => "Products are unavailable right now. Please try again.".to_string(),
            StorefrontError::Request(e) => e.user_message(),
        }
    }
}

/// A warehouse request the customer is watching.
pub struct RequestTracking {
    pub request_id: RequestId,
    pub product: Product,
    pub view: StatusView,
}

pub enum ProductRequestOutcome {
    /// Nothing to fetch: the customer can pick it up.
    OnShelf { product: Product },
    /// No request is created; the customer is pointed to alternatives.
    OutOfStock { product: Product },
    Requested(RequestTracking),
}

#[derive(Clone)]
pub struct Storefront {
    products: ProductClient,
    requests: RequestClient,
    schedule: SimulationSchedule,
}

impl Storefront {
    pub fn new(products: ProductClient, requests: RequestClient, schedule: SimulationSchedule) -> Self {
        Self {
            products,
            requests,
            schedule,
        }
    }

    /// Case-insensitive search on name, brand and category.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, StorefrontError> {
        Ok(self.products.search_products(query).await?)
    }

    /// Act on a product card. Only warehouse items create a request.
    #[instrument(skip(self))]
    pub async fn request_product(
        &self,
        product_id: String,
        district: &str,
    ) -> Result<ProductRequestOutcome, StorefrontError> {
        let product = self
            .products
            .get_product(product_id.clone())
            .await?
            .ok_or(StorefrontError::UnknownProduct(product_id))?;

        match product.availability() {
            Availability::Shelf => Ok(ProductRequestOutcome::OnShelf { product }),
            Availability::OutOfStock => {
                info!(product_id = %product.id, "Out of stock, no request created");
                Ok(ProductRequestOutcome::OutOfStock { product })
            }
            Availability::Warehouse => {
                let request_id = self
                    .requests
                    .create_request(RequestCreate {
                        product_id: product.id.clone(),
                        district: district.to_string(),
                        requested_at: Utc::now(),
                    })
                    .await?;
                info!(request_id = %request_id, product_id = %product.id, "Warehouse request created");
                Ok(ProductRequestOutcome::Requested(RequestTracking {
                    request_id,
                    product,
                    view: StatusView::start(self.schedule),
                }))
            }
        }
    }

    /// Customer action boundary: failures become a notice.
    pub async fn handle_product_request(
        &self,
        product_id: String,
        district: &str,
    ) -> Result<ProductRequestOutcome, Notice> {
        self.request_product(product_id, district).await.map_err(|e| {
            error!(error = %e, "Product request failed");
            Notice::failure(e.user_message())
        })
    }
}
