//! Profile updates for both account kinds.

use std::sync::Arc;

use crate::domain::account::{AccountError, Client, ClientPatch, Provider, ProviderPatch};
use crate::domain::foundation::{ClientId, ProviderId};
use crate::ports::AccountStore;

/// Applies profile patches to client and provider documents.
pub struct UpdateProfileHandler {
    accounts: Arc<dyn AccountStore>,
}

impl UpdateProfileHandler {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    pub async fn update_client(
        &self,
        id: &ClientId,
        patch: ClientPatch,
    ) -> Result<Client, AccountError> {
        let mut client = self
            .accounts
            .get_client(id)
            .await?
            .ok_or_else(|| AccountError::ClientNotFound(id.clone()))?;
        client.apply_patch(patch)?;
        self.accounts.update_client(&client).await?;
        Ok(client)
    }

    pub async fn update_provider(
        &self,
        id: &ProviderId,
        patch: ProviderPatch,
    ) -> Result<Provider, AccountError> {
        let mut provider = self
            .accounts
            .get_provider(id)
            .await?
            .ok_or_else(|| AccountError::ProviderNotFound(id.clone()))?;
        provider.apply_patch(patch)?;
        self.accounts.update_provider(&provider).await?;
        Ok(provider)
    }
}
