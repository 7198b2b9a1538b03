//! Cache types for catalog responses.

use mybn_core::{Business, BusinessId, Category};

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Business(BusinessId),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Business(Box<Business>),
    Categories(Vec<Category>),
}
