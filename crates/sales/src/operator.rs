//! Order use cases (application-level orchestration).
//!
//! `OrderOperator` resolves orders, customers and products through the
//! repository traits, enforces that an order is only touched on behalf of the
//! customer it is billed to, and delegates the line-item change to the
//! `Order` aggregate.
//!
//! ```text
//! (order_id, customer_id, product_id, quantity)
//!   ↓
//! 1. Fetch order, check ownership, sync the stored customer into it
//!   ↓
//! 2. Fetch product, build the line item from its snapshot
//!   ↓
//! 3. Order::add_product / remove_product (all-or-nothing)
//!   ↓
//! 4. OrderChange returned to the caller, persisted with `commit`
//! ```
//!
//! The use cases themselves never store anything: persisting the mutated
//! aggregates is an explicit `commit`, guarded per aggregate by the version
//! it was fetched at. The customer is always read from its own repository,
//! so several orders billed to one customer debit the same balance.
//! `commit` verifies every version before its first write; the writes
//! themselves are not atomic across repositories.

use std::sync::Arc;

use chrono::Utc;

use storefront_core::{
    AggregateRoot, CustomerId, DomainError, DomainResult, ExpectedVersion, OrderId, ProductId,
};
use storefront_parties::CustomerRepository;
use storefront_products::{Product, ProductRepository};

use crate::order::{Order, OrderItem, StockPolicy};
use crate::repository::OrderRepository;

/// Aggregates mutated by a successful use case, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderChange {
    order: Order,
    product: Product,
    order_version: u64,
    customer_version: u64,
    product_version: u64,
}

impl OrderChange {
    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn into_parts(self) -> (Order, Product) {
        (self.order, self.product)
    }
}

/// Use-case orchestrator over the order, customer and product repositories.
pub struct OrderOperator {
    orders: Arc<dyn OrderRepository>,
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
    stock_policy: StockPolicy,
}

impl OrderOperator {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        customers: Arc<dyn CustomerRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            orders,
            customers,
            products,
            stock_policy: StockPolicy::default(),
        }
    }

    pub fn with_stock_policy(mut self, stock_policy: StockPolicy) -> Self {
        self.stock_policy = stock_policy;
        self
    }

    pub fn stock_policy(&self) -> StockPolicy {
        self.stock_policy
    }

    /// Open and store an empty order billed to `customer_id`.
    pub fn open_order(&self, customer_id: CustomerId) -> DomainResult<Order> {
        let customer = self.customers.fetch(&customer_id)?;
        let order = Order::new(OrderId::new(), customer, Utc::now());
        self.orders.store(&order, ExpectedVersion::Exact(0))?;

        tracing::info!(order_id = %order.id_typed(), customer_id = %customer_id, "order opened");
        Ok(order)
    }

    /// Add `product_count` units of `product_id` to the customer's order.
    ///
    /// Nothing is stored; the mutated order and product come back in the
    /// `OrderChange` for the caller to `commit`.
    pub fn add_product(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
        product_id: ProductId,
        product_count: u32,
    ) -> DomainResult<OrderChange> {
        let (mut order, mut product, versions) =
            self.load_for_customer(order_id, customer_id, product_id)?;

        let item = OrderItem::new(product.clone(), product_count)?;
        if let Err(err) = order.add_product_with_policy(item, &mut product, self.stock_policy) {
            tracing::debug!(
                order_id = %order_id,
                product_id = %product_id,
                quantity = product_count,
                error = %err,
                "add product rejected"
            );
            return Err(err);
        }

        tracing::debug!(
            order_id = %order_id,
            product_id = %product_id,
            quantity = product_count,
            total = %order.total(),
            "product added to order"
        );
        Ok(versions.into_change(order, product))
    }

    /// Remove `product_count` units of `product_id` from the customer's order.
    pub fn remove_product(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
        product_id: ProductId,
        product_count: u32,
    ) -> DomainResult<OrderChange> {
        let (mut order, mut product, versions) =
            self.load_for_customer(order_id, customer_id, product_id)?;

        let item = OrderItem::new(product.clone(), product_count)?;
        if let Err(err) = order.remove_product(item, &mut product) {
            tracing::debug!(
                order_id = %order_id,
                product_id = %product_id,
                quantity = product_count,
                error = %err,
                "remove product rejected"
            );
            return Err(err);
        }

        tracing::debug!(
            order_id = %order_id,
            product_id = %product_id,
            quantity = product_count,
            total = %order.total(),
            "product removed from order"
        );
        Ok(versions.into_change(order, product))
    }

    /// Persist the order, its customer snapshot and the product.
    ///
    /// Fails with `Conflict`, before anything is written, if any of the
    /// three was written by someone else since it was fetched.
    pub fn commit(&self, change: OrderChange) -> DomainResult<()> {
        let order_id = change.order.id_typed();
        let customer_id = change.order.customer().id_typed();
        let product_id = change.product.id_typed();

        ensure_unchanged(
            "order",
            change.order_version,
            self.orders.fetch(&order_id)?.version(),
        )?;
        ensure_unchanged(
            "customer",
            change.customer_version,
            self.customers.fetch(&customer_id)?.version(),
        )?;
        ensure_unchanged(
            "product",
            change.product_version,
            self.products.fetch(&product_id)?.version(),
        )?;

        self.orders
            .store(&change.order, ExpectedVersion::Exact(change.order_version))?;
        self.customers.store(
            change.order.customer(),
            ExpectedVersion::Exact(change.customer_version),
        )?;
        self.products
            .store(&change.product, ExpectedVersion::Exact(change.product_version))?;

        tracing::info!(
            order_id = %order_id,
            version = change.order.version(),
            total = %change.order.total(),
            "order committed"
        );
        Ok(())
    }

    fn load_for_customer(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> DomainResult<(Order, Product, FetchedVersions)> {
        let mut order = self.orders.fetch(&order_id)?;
        if !order.belongs_to(customer_id) {
            tracing::warn!(
                order_id = %order_id,
                customer_id = %customer_id,
                "order requested by a customer it does not belong to"
            );
            return Err(DomainError::OrderOwnershipMismatch {
                order_id,
                customer_id,
            });
        }

        let customer = self.customers.fetch(&customer_id)?;
        order.sync_customer(customer)?;

        let product = self.products.fetch(&product_id)?;
        let versions = FetchedVersions {
            order: order.version(),
            customer: order.customer().version(),
            product: product.version(),
        };
        Ok((order, product, versions))
    }
}

fn ensure_unchanged(aggregate: &'static str, fetched: u64, stored: u64) -> DomainResult<()> {
    ExpectedVersion::Exact(fetched).check(stored).inspect_err(|_| {
        tracing::warn!(aggregate, fetched, stored, "commit rejected: changed since it was read");
    })
}

struct FetchedVersions {
    order: u64,
    customer: u64,
    product: u64,
}

impl FetchedVersions {
    fn into_change(self, order: Order, product: Product) -> OrderChange {
        OrderChange {
            order,
            product,
            order_version: self.order,
            customer_version: self.customer,
            product_version: self.product,
        }
    }
}
