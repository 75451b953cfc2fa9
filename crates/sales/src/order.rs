use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{
    AggregateRoot, CustomerId, DomainError, DomainResult, Money, OrderId, ProductId, ValueObject,
};
use storefront_parties::Customer;
use storefront_products::Product;

/// How `Order::add_product_with_policy` treats a product with too little stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockPolicy {
    /// Insufficient stock rejects the line item and reverses the balance debit.
    #[default]
    Enforce,
    /// Insufficient stock is logged and the line item is added anyway; the
    /// stock record is left untouched.
    ///
    /// Units added this way were never taken off the shelf, but
    /// `remove_product` still shelves them, so removing such a line grows
    /// stock. Kept for compatibility with the unchecked legacy behaviour.
    Permissive,
}

/// Order line: a product snapshot and how many units of it are ordered.
///
/// The product is held by value, so the recorded unit price is the one in
/// effect when the line was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    item: Product,
    item_count: u32,
}

impl ValueObject for OrderItem {}

impl OrderItem {
    pub fn new(item: Product, item_count: u32) -> DomainResult<Self> {
        if item_count == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(Self { item, item_count })
    }

    pub fn item(&self) -> &Product {
        &self.item
    }

    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    pub fn product_id(&self) -> ProductId {
        self.item.id_typed()
    }

    pub fn unit_price(&self) -> Money {
        self.item.price()
    }

    /// `item_count * unit_price`.
    pub fn line_total(&self) -> DomainResult<Money> {
        self.unit_price().times(self.item_count)
    }
}

/// Aggregate root: Order.
///
/// Owns its line items, the running total and a by-value snapshot of the
/// customer it is billed to. Every change of `total` is mirrored by an equal
/// and opposite change of the customer's balance, and a rejected mutation
/// leaves items, total, balance and stock exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    date: DateTime<Utc>,
    items: Vec<OrderItem>,
    total: Money,
    customer: Customer,
    version: u64,
}

impl Order {
    /// Open an empty order billed to `customer`.
    pub fn new(id: OrderId, customer: Customer, date: DateTime<Utc>) -> Self {
        Self {
            id,
            date,
            items: Vec::new(),
            total: Money::ZERO,
            customer,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn belongs_to(&self, customer_id: CustomerId) -> bool {
        self.customer.id_typed() == customer_id
    }

    pub fn line_for(&self, product_id: &ProductId) -> Option<&OrderItem> {
        self.items.iter().find(|line| line.product_id() == *product_id)
    }

    /// Replace the customer snapshot with the stored customer record.
    ///
    /// Another order for the same customer may have moved the balance since
    /// this order was last saved. The order version is not bumped: the
    /// snapshot only catches up with state that is already persisted.
    pub fn sync_customer(&mut self, customer: Customer) -> DomainResult<()> {
        if !self.belongs_to(customer.id_typed()) {
            return Err(DomainError::OrderOwnershipMismatch {
                order_id: self.id,
                customer_id: customer.id_typed(),
            });
        }
        self.customer = customer;
        Ok(())
    }

    /// Number of units across all lines.
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.item_count)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a line item, taking its units off `stock` (strict stock policy).
    pub fn add_product(&mut self, item: OrderItem, stock: &mut Product) -> DomainResult<()> {
        self.add_product_with_policy(item, stock, StockPolicy::Enforce)
    }

    /// Add a line item, debiting the customer and taking units off `stock`.
    ///
    /// `stock` is the live record the item's snapshot was taken from. A line
    /// for the same product is merged by incrementing its count.
    pub fn add_product_with_policy(
        &mut self,
        item: OrderItem,
        stock: &mut Product,
        policy: StockPolicy,
    ) -> DomainResult<()> {
        ensure_positive(item.item_count)?;
        ensure_same_product(&item, stock)?;

        let cost = item.line_total()?;
        let new_total = self.total.checked_add(cost)?;

        let position = self.position_of(item.product_id());
        let merged_count = match position {
            Some(index) => Some(self.merged_count(index, &item)?),
            None => None,
        };

        let customer_before = self.customer.clone();
        self.customer.rebalance(cost.checked_neg()?)?;

        if let Err(err) = stock.unshelf(item.item_count) {
            match policy {
                StockPolicy::Enforce => {
                    self.customer = customer_before;
                    return Err(err);
                }
                StockPolicy::Permissive => {
                    tracing::warn!(
                        order_id = %self.id,
                        product_id = %item.product_id(),
                        requested = item.item_count,
                        available = stock.stock_count(),
                        "adding line item without enough stock"
                    );
                }
            }
        }

        match (position, merged_count) {
            (Some(index), Some(count)) => self.items[index].item_count = count,
            _ => self.items.push(item),
        }
        self.total = new_total;
        self.version += 1;
        Ok(())
    }

    /// Remove `item.item_count` units of a product, returning them to `stock`
    /// and refunding the customer at the price recorded on the line.
    pub fn remove_product(&mut self, item: OrderItem, stock: &mut Product) -> DomainResult<()> {
        ensure_positive(item.item_count)?;
        ensure_same_product(&item, stock)?;

        let product_id = item.product_id();
        let index = self
            .position_of(product_id)
            .ok_or(DomainError::ProductNotInOrder(product_id))?;

        let line = &self.items[index];
        if line.item_count < item.item_count {
            return Err(DomainError::InsufficientLineItemQuantity {
                available: line.item_count,
                requested: item.item_count,
            });
        }

        let refund = line.unit_price().times(item.item_count)?;
        let new_total = self.total.checked_sub(refund)?;
        self.customer.rebalance(refund)?;

        if line.item_count == item.item_count {
            self.items.remove(index);
        } else {
            self.items[index].item_count -= item.item_count;
        }
        stock.shelf(item.item_count);

        self.total = new_total;
        self.version += 1;
        Ok(())
    }

    fn position_of(&self, product_id: ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|line| line.product_id() == product_id)
    }

    fn merged_count(&self, index: usize, item: &OrderItem) -> DomainResult<u32> {
        let line = &self.items[index];
        if line.unit_price() != item.unit_price() {
            return Err(DomainError::validation(format!(
                "unit price {} differs from {} recorded on the existing line",
                item.unit_price(),
                line.unit_price()
            )));
        }
        line.item_count
            .checked_add(item.item_count)
            .ok_or_else(|| DomainError::validation("quantity overflow"))
    }
}

fn ensure_positive(count: u32) -> DomainResult<()> {
    if count == 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }
    Ok(())
}

fn ensure_same_product(item: &OrderItem, stock: &Product) -> DomainResult<()> {
    if item.product_id() != stock.id_typed() {
        return Err(DomainError::validation(
            "line item product does not match the stock record",
        ));
    }
    Ok(())
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
