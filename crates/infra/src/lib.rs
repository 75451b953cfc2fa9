//! Infrastructure layer: storage adapters and configuration.

pub mod config;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use config::{ConfigError, OrderSettings, Settings};
pub use store::{
    InMemoryCustomerRepository, InMemoryOrderRepository, InMemoryProductRepository, InMemoryStore,
};
