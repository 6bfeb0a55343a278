//! The product catalog, fixed for the lifetime of a session.

use bites_core::{CoreError, CoreResult, Product};

/// Products on offer, in display order.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Wraps an already validated product list.
    pub fn new(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Looks up a product by id.
    pub fn get(&self, product_id: &str) -> CoreResult<&Product> {
        self.products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))
    }
}
