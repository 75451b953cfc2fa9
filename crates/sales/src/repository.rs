//! Persistence boundary for orders.

use std::sync::Arc;

use storefront_core::{DomainResult, ExpectedVersion, OrderId};

use crate::order::Order;

/// Lookup/store capability for orders, implemented by the persistence collaborator.
///
/// The order is stored together with its embedded customer snapshot and line
/// items; the canonical customer and product records are stored through their
/// own repositories.
pub trait OrderRepository: Send + Sync {
    fn store(&self, order: &Order, expected: ExpectedVersion) -> DomainResult<()>;

    /// Fetch an order by id; unknown ids fail with `DomainError::NotFound`.
    fn fetch(&self, id: &OrderId) -> DomainResult<Order>;
}

impl<R> OrderRepository for Arc<R>
where
    R: OrderRepository + ?Sized,
{
    fn store(&self, order: &Order, expected: ExpectedVersion) -> DomainResult<()> {
        (**self).store(order, expected)
    }

    fn fetch(&self, id: &OrderId) -> DomainResult<Order> {
        (**self).fetch(id)
    }
}
