//! Sales orders domain module.
//!
//! This crate contains the order aggregate and its line items, plus the
//! `OrderOperator` use-case orchestrator that resolves orders and products
//! through repositories. Domain logic is deterministic; the only IO is what
//! the injected repositories do.

pub mod operator;
pub mod order;
pub mod repository;

pub use operator::{OrderChange, OrderOperator};
pub use order::{Order, OrderItem, StockPolicy};
pub use repository::OrderRepository;
