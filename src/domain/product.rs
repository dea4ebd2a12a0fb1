use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a customer can get a product right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Shelf,
    Warehouse,
    OutOfStock,
}

/// Staff-facing stock classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

/// Represents a product in the store inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub price: f64,
    pub shelf_stock: u32,
    pub warehouse_stock: u32,
    pub last_updated: DateTime<Utc>,
}

impl Product {
    pub fn total_stock(&self) -> u32 {
        self.shelf_stock.saturating_add(self.warehouse_stock)
    }

    pub fn availability(&self) -> Availability {
        if self.shelf_stock > 0 {
            Availability::Shelf
        } else if self.warehouse_stock > 0 {
            Availability::Warehouse
        } else {
            Availability::OutOfStock
        }
    }

    /// Classify stock against the low-stock threshold (total strictly below it).
    pub fn stock_status(&self, low_stock_threshold: u32) -> StockStatus {
        match self.total_stock() {
            0 => StockStatus::OutOfStock,
            total if total < low_stock_threshold => StockStatus::LowStock,
            _ => StockStatus::InStock,
        }
    }

    /// Case-insensitive match on name, brand or category.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.brand.to_lowercase().contains(&query)
            || self.category.to_lowercase().contains(&query)
    }
}

/// Parameters for creating a product.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub sku: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub price: f64,
    pub shelf_stock: u32,
    pub warehouse_stock: u32,
}

impl ProductCreate {
    pub fn new(sku: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            brand: String::new(),
            category: String::new(),
            description: String::new(),
            price,
            shelf_stock: 0,
            warehouse_stock: 0,
        }
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn stock(mut self, shelf: u32, warehouse: u32) -> Self {
        self.shelf_stock = shelf;
        self.warehouse_stock = warehouse;
        self
    }
}

/// Stock table edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub shelf_stock: Option<u32>,
    pub warehouse_stock: Option<u32>,
    pub price: Option<f64>,
}
