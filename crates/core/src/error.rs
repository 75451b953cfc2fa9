//! Domain error model.

use thiserror::Error;

use crate::id::{CustomerId, OrderId, ProductId};
use crate::money::Money;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is recoverable and is surfaced to the caller unchanged. An
/// operation that returns one of these has left all state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A balance adjustment would drive a customer's balance below zero.
    #[error("insufficient balance: requested {requested}, available {balance}")]
    InsufficientBalance { balance: Money, requested: Money },

    /// A stock decrement would drive a product's stock below zero.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { available: u32, requested: u32 },

    /// Removal requested for a product the order does not contain.
    #[error("product {0} is not part of the order")]
    ProductNotInOrder(ProductId),

    /// Removal requested for more units than the line item holds.
    #[error("order line holds {available} unit(s), cannot remove {requested}")]
    InsufficientLineItemQuantity { available: u32, requested: u32 },

    /// The order is billed to a different customer than the requester.
    #[error("order {order_id} does not belong to customer {customer_id}")]
    OrderOwnershipMismatch {
        order_id: OrderId,
        customer_id: CustomerId,
    },

    /// A repository lookup did not resolve to an entity.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A value failed validation (e.g. zero quantity, negative price).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A conflict occurred (e.g. stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The storage collaborator failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code, for handler layers mapping errors to responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::ProductNotInOrder(_) => "product_not_in_order",
            Self::InsufficientLineItemQuantity { .. } => "insufficient_line_item_quantity",
            Self::OrderOwnershipMismatch { .. } => "order_ownership_mismatch",
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation",
            Self::InvalidId(_) => "invalid_id",
            Self::Conflict(_) => "conflict",
            Self::Storage(_) => "storage",
        }
    }
}
