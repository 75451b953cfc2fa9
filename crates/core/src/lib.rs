//! `storefront-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error taxonomy, strongly-typed identifiers, the `Money` value object and
//! the aggregate/versioning traits shared by customers, products and orders.

pub mod aggregate;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use id::{CustomerId, OrderId, ProductId};
pub use money::Money;
pub use value_object::ValueObject;
