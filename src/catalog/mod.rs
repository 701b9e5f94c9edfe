pub mod client;
pub mod types;

pub use client::{CatalogClient, ShopeeCatalogClient};
pub use types::ProductNode;
