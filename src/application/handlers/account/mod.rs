//! Account use cases: signup, profile updates, discovery.

mod discover_providers;
mod register_client;
mod register_provider;
mod update_profile;

pub use discover_providers::{DiscoverProvidersHandler, ProviderListing};
pub use register_client::RegisterClientHandler;
pub use register_provider::RegisterProviderHandler;
pub use update_profile::UpdateProfileHandler;
