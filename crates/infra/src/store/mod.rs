//! In-memory repositories for the order, customer and product aggregates.

pub mod in_memory;

pub use in_memory::{
    InMemoryCustomerRepository, InMemoryOrderRepository, InMemoryProductRepository, InMemoryStore,
};
