//! Cache types for catalog API responses.

use shopnow_core::{Category, Product, ProductId};

use super::ProductPage;

/// Cache key for catalog responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    /// Keyed by the canonical filter query string.
    Products(String),
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Products(ProductPage),
    Product(Box<Product>),
}
