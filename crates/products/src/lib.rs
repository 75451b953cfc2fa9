//! Products domain module: catalog price and shelf stock.
//!
//! Pure domain logic (no IO, no HTTP, no storage).

pub mod product;
pub mod repository;

pub use product::Product;
pub use repository::ProductRepository;
