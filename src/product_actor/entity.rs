use std::cmp::Ordering;

use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductUpdate};
use super::actions::{ProductAction, ProductActionResult};

impl Entity for Product {
    type Id = String;
    type CreateParams = ProductCreate;
    type Update = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Filter = ();

    const TABLE: &'static str = "products";

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Product from creation parameters.
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the product
    /// * `params` - Catalogue data and initial stock levels
    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, String> {
        if params.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if params.price < 0.0 {
            return Err(format!("price must not be negative, got {}", params.price));
        }
        Ok(Self {
            id,
            sku: params.sku,
            name: params.name,
            brand: params.brand,
            category: params.category,
            description: params.description,
            price: params.price,
            shelf_stock: params.shelf_stock,
            warehouse_stock: params.warehouse_stock,
            last_updated: Utc::now(),
        })
    }

    /// Applies a stock table edit and stamps `last_updated`.
    fn on_update(&mut self, update: ProductUpdate) -> Result<(), String> {
        if let Some(price) = update.price {
            if price < 0.0 {
                return Err(format!("price must not be negative, got {}", price));
            }
            self.price = price;
        }
        if let Some(shelf) = update.shelf_stock {
            self.shelf_stock = shelf;
        }
        if let Some(warehouse) = update.warehouse_stock {
            self.warehouse_stock = warehouse;
        }
        self.last_updated = Utc::now();
        Ok(())
    }

    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, String> {
        match action {
            ProductAction::CheckStock => {
                Ok(ProductActionResult::CheckStock(self.shelf_stock, self.warehouse_stock))
            }
            ProductAction::DecrementShelfStock => {
                if self.shelf_stock == 0 {
                    return Err(format!("No shelf stock left for product {}", self.id));
                }
                self.shelf_stock -= 1;
                self.last_updated = Utc::now();
                Ok(ProductActionResult::DecrementShelfStock(self.clone()))
            }
        }
    }

    fn action_committed(result: &ProductActionResult) -> bool {
        matches!(result, ProductActionResult::DecrementShelfStock(_))
    }

    fn list_order(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name).then_with(|| self.id.cmp(&other.id))
    }
}
