use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductCreate, ProductUpdate};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    #[instrument(skip(self), fields(product_name = %params.name))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<String, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(ProductError::from)
    }

    /// Every product, sorted by name.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        self.inner.list(()).await.map_err(ProductError::from)
    }

    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ProductError> {
        let products = self.list_products().await?;
        Ok(products.into_iter().filter(|p| p.matches_query(query)).collect())
    }

    /// Staff stock table edit.
    #[instrument(skip(self))]
    pub async fn update_stock(
        &self,
        id: String,
        shelf_stock: u32,
        warehouse_stock: u32,
    ) -> Result<Product, ProductError> {
        debug!("Sending request");
        let update = ProductUpdate {
            shelf_stock: Some(shelf_stock),
            warehouse_stock: Some(warehouse_stock),
            price: None,
        };
        self.inner.update(id, update).await.map_err(ProductError::from)
    }

    /// Returns `(shelf, warehouse)`.
    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: String) -> Result<(u32, u32), ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::CheckStock).await {
            Ok(ProductActionResult::CheckStock(shelf, warehouse)) => Ok((shelf, warehouse)),
            Ok(other) => Err(ProductError::UnexpectedReply(format!("{:?}", other))),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn decrement_shelf_stock(&self, id: String) -> Result<Product, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::DecrementShelfStock).await {
            Ok(ProductActionResult::DecrementShelfStock(product)) => Ok(product),
            Ok(other) => Err(ProductError::UnexpectedReply(format!("{:?}", other))),
            Err(e) => Err(e.into()),
        }
    }
}
