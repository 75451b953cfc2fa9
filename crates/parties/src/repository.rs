//! Persistence boundary for customers.

use std::sync::Arc;

use storefront_core::{CustomerId, DomainResult, ExpectedVersion};

use crate::customer::Customer;

/// Lookup/store capability for customers, implemented by the persistence collaborator.
pub trait CustomerRepository: Send + Sync {
    /// Persist the customer, guarded by the version it was read at.
    fn store(&self, customer: &Customer, expected: ExpectedVersion) -> DomainResult<()>;

    /// Fetch a customer by id; unknown ids fail with `DomainError::NotFound`.
    fn fetch(&self, id: &CustomerId) -> DomainResult<Customer>;
}

impl<R> CustomerRepository for Arc<R>
where
    R: CustomerRepository + ?Sized,
{
    fn store(&self, customer: &Customer, expected: ExpectedVersion) -> DomainResult<()> {
        (**self).store(customer, expected)
    }

    fn fetch(&self, id: &CustomerId) -> DomainResult<Customer> {
        (**self).fetch(id)
    }
}
