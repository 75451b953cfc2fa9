use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use storefront_core::{
    AggregateRoot, CustomerId, DomainError, DomainResult, ExpectedVersion, OrderId, ProductId,
};
use storefront_parties::{Customer, CustomerRepository};
use storefront_products::{Product, ProductRepository};
use storefront_sales::{Order, OrderRepository};

/// In-memory, version-checked aggregate store for tests/dev.
///
/// Keeps the latest stored copy of each aggregate. A store is accepted only
/// if the expectation matches the version currently held (0 when absent).
#[derive(Debug)]
pub struct InMemoryStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
    writes: AtomicUsize,
}

pub type InMemoryOrderRepository = InMemoryStore<OrderId, Order>;
pub type InMemoryCustomerRepository = InMemoryStore<CustomerId, Customer>;
pub type InMemoryProductRepository = InMemoryStore<ProductId, Product>;

impl<K, V> InMemoryStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of successful writes so far.
    pub fn store_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> DomainResult<usize> {
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::storage("lock poisoned"))?;
        Ok(map.len())
    }

    pub fn is_empty(&self) -> DomainResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl<K, V> Default for InMemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> InMemoryStore<K, V>
where
    K: Clone + Eq + Hash + core::fmt::Debug,
    V: AggregateRoot<Id = K> + Clone,
{
    pub fn get(&self, key: &K) -> DomainResult<Option<V>> {
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::storage("lock poisoned"))?;
        Ok(map.get(key).cloned())
    }

    pub fn upsert(&self, value: &V, expected: ExpectedVersion) -> DomainResult<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::storage("lock poisoned"))?;

        let current = map.get(value.id()).map(|v| v.version()).unwrap_or(0);
        if let Err(err) = expected.check(current) {
            tracing::warn!(id = ?value.id(), current, ?expected, "rejected stale write");
            return Err(err);
        }

        map.insert(value.id().clone(), value.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(id = ?value.id(), version = value.version(), "stored aggregate");
        Ok(())
    }

    fn fetch_or_not_found(&self, key: &K, entity: &'static str) -> DomainResult<V>
    where
        K: core::fmt::Display,
    {
        self.get(key)?
            .ok_or_else(|| DomainError::not_found(entity, key))
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn store(&self, order: &Order, expected: ExpectedVersion) -> DomainResult<()> {
        self.upsert(order, expected)
    }

    fn fetch(&self, id: &OrderId) -> DomainResult<Order> {
        self.fetch_or_not_found(id, "order")
    }
}

impl CustomerRepository for InMemoryCustomerRepository {
    fn store(&self, customer: &Customer, expected: ExpectedVersion) -> DomainResult<()> {
        self.upsert(customer, expected)
    }

    fn fetch(&self, id: &CustomerId) -> DomainResult<Customer> {
        self.fetch_or_not_found(id, "customer")
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn store(&self, product: &Product, expected: ExpectedVersion) -> DomainResult<()> {
        self.upsert(product, expected)
    }

    fn fetch(&self, id: &ProductId) -> DomainResult<Product> {
        self.fetch_or_not_found(id, "product")
    }
}
