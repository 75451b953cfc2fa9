use serde::{Deserialize, Serialize};

use storefront_core::{AggregateRoot, CustomerId, DomainError, DomainResult, Money};

/// Aggregate root: Customer.
///
/// Owns the account balance an order is billed against. The balance never
/// goes below zero: an adjustment that would overdraw it is rejected and the
/// balance is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    name: String,
    balance: Money,
    version: u64,
}

impl Customer {
    /// Register a customer with an opening balance.
    pub fn new(id: CustomerId, name: impl Into<String>, opening_balance: Money) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if opening_balance.is_negative() {
            return Err(DomainError::validation("opening balance cannot be negative"));
        }

        Ok(Self {
            id,
            name,
            balance: opening_balance,
            version: 0,
        })
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Whether `amount` could be debited without overdrawing the account.
    pub fn can_afford(&self, amount: Money) -> bool {
        self.balance
            .checked_sub(amount)
            .map(|rest| !rest.is_negative())
            .unwrap_or(false)
    }

    /// Adjust the balance by a signed `amount`.
    ///
    /// Fails with `InsufficientBalance` when the result would be negative.
    pub fn rebalance(&mut self, amount: Money) -> DomainResult<()> {
        let next = self.balance.checked_add(amount)?;
        if next.is_negative() {
            return Err(DomainError::InsufficientBalance {
                balance: self.balance,
                requested: amount.checked_neg()?,
            });
        }

        self.balance = next;
        self.version += 1;
        Ok(())
    }
}

impl AggregateRoot for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
