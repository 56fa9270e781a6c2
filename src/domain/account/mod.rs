//! Account domain - client and provider account documents.

mod client;
mod errors;
mod provider;

pub use client::{Client, ClientPatch, NewClient};
pub use errors::AccountError;
pub use provider::{NewProvider, Provider, ProviderPatch};
