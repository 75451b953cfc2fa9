use serde::{Deserialize, Serialize};

use storefront_core::{AggregateRoot, DomainError, DomainResult, Money, ProductId};

/// Aggregate root: Product.
///
/// Carries the unit price line items are charged at and the number of units
/// on the shelf. Stock can be taken off the shelf only while enough remains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    price: Money,
    stock_count: u32,
    version: u64,
}

impl Product {
    /// Create a product with an initial stock count.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Money,
        stock_count: u32,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if price.is_negative() {
            return Err(DomainError::validation("price cannot be negative"));
        }

        Ok(Self {
            id,
            name,
            price,
            stock_count,
            version: 0,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn stock_count(&self) -> u32 {
        self.stock_count
    }

    pub fn in_stock(&self, count: u32) -> bool {
        self.stock_count >= count
    }

    /// Take `count` units off the shelf.
    ///
    /// Fails with `InsufficientStock` (stock unchanged) when fewer remain.
    pub fn unshelf(&mut self, count: u32) -> DomainResult<()> {
        if !self.in_stock(count) {
            return Err(DomainError::InsufficientStock {
                available: self.stock_count,
                requested: count,
            });
        }

        self.stock_count -= count;
        self.version += 1;
        Ok(())
    }

    /// Put `count` units back on the shelf.
    pub fn shelf(&mut self, count: u32) {
        // No capacity is modelled; saturate rather than wrap.
        self.stock_count = self.stock_count.saturating_add(count);
        self.version += 1;
    }

    /// Change the catalog price. Line items already placed keep the price they were added at.
    pub fn reprice(&mut self, price: Money) -> DomainResult<()> {
        if price.is_negative() {
            return Err(DomainError::validation("price cannot be negative"));
        }
        self.price = price;
        self.version += 1;
        Ok(())
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
