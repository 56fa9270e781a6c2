//! PostgreSQL store adapters.
//!
//! Documents are stored whole in JSONB columns. The boolean mutators are
//! single guarded UPDATE statements, so idempotency and first-writer-wins
//! hold across processes, not just within one.

mod account_store;
mod catalog_store;

pub use account_store::PostgresAccountStore;
pub use catalog_store::PostgresCatalogStore;
