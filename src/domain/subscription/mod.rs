//! Subscription domain - lifecycle entries and coordinator errors.

mod entry;
mod errors;

pub use entry::SubscriptionEntry;
pub use errors::SubscriptionError;
