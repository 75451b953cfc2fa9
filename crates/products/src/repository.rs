//! Persistence boundary for products.

use std::sync::Arc;

use storefront_core::{DomainResult, ExpectedVersion, ProductId};

use crate::product::Product;

/// Lookup/store capability for products, implemented by the persistence collaborator.
pub trait ProductRepository: Send + Sync {
    fn store(&self, product: &Product, expected: ExpectedVersion) -> DomainResult<()>;

    /// Fetch a product by id; unknown ids fail with `DomainError::NotFound`.
    fn fetch(&self, id: &ProductId) -> DomainResult<Product>;
}

impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository + ?Sized,
{
    fn store(&self, product: &Product, expected: ExpectedVersion) -> DomainResult<()> {
        (**self).store(product, expected)
    }

    fn fetch(&self, id: &ProductId) -> DomainResult<Product> {
        (**self).fetch(id)
    }
}
