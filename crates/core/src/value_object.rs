//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: two values with the same attributes are
/// equal. `Money` and an order's line items are value objects; customers,
/// products and orders are aggregates with identity.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
