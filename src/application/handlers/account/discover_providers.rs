//! Provider discovery driven by client preferences.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::account::{AccountError, Provider};
use crate::domain::catalog::Plan;
use crate::domain::foundation::ClientId;
use crate::ports::{AccountStore, CatalogStore};

/// A provider and its current plans, as shown on the browse screen.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderListing {
    pub provider: Provider,
    pub plans: Vec<Plan>,
}

/// Lists providers whose category matches the client's preferences, with
/// their plans attached. An empty preference set browses everything.
pub struct DiscoverProvidersHandler {
    catalog: Arc<dyn CatalogStore>,
    accounts: Arc<dyn AccountStore>,
}

impl DiscoverProvidersHandler {
    pub fn new(catalog: Arc<dyn CatalogStore>, accounts: Arc<dyn AccountStore>) -> Self {
        Self { catalog, accounts }
    }

    pub async fn execute(&self, client_id: &ClientId) -> Result<Vec<ProviderListing>, AccountError> {
        let client = self
            .accounts
            .get_client(client_id)
            .await?
            .ok_or_else(|| AccountError::ClientNotFound(client_id.clone()))?;

        let categories: Vec<String> = client.preferences.iter().cloned().collect();
        let providers = self.accounts.list_providers_by_categories(&categories).await?;

        let mut listings = Vec::with_capacity(providers.len());
        for provider in providers {
            let plans = self.catalog.list_plans_by_provider(&provider.id).await?;
            listings.push(ProviderListing { provider, plans });
        }
        Ok(listings)
    }
}
