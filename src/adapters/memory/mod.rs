//! In-memory store adapters, used in tests and local development.

mod account_store;
mod catalog_store;

pub use account_store::InMemoryAccountStore;
pub use catalog_store::InMemoryCatalogStore;
