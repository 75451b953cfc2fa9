//! Customers domain module.
//!
//! This crate contains the business rules for customer accounts, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod customer;
pub mod repository;

pub use customer::Customer;
pub use repository::CustomerRepository;
