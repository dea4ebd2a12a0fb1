/// Custom actions for Product entities.
///
/// These actions represent stock operations that go beyond editing the
/// stock table.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Reads the current shelf and warehouse levels without modifying them.
    CheckStock,
    /// Removes one unit from the shelf after a request is delivered.
    ///
    /// # Errors
    /// Fails when the shelf is already empty.
    DecrementShelfStock,
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone)]
pub enum ProductActionResult {
    /// Result from CheckStock action - `(shelf, warehouse)`
    CheckStock(u32, u32),
    /// Result from DecrementShelfStock action - the product after the decrement
    DecrementShelfStock(crate::domain::Product),
}
