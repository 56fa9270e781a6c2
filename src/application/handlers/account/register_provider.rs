//! Provider signup.

use std::sync::Arc;

use tracing::info;

use crate::domain::account::{AccountError, NewProvider, Provider};
use crate::domain::foundation::{ProviderId, StoreError};
use crate::ports::AccountStore;

/// Creates the provider document for a freshly authenticated account.
pub struct RegisterProviderHandler {
    accounts: Arc<dyn AccountStore>,
}

impl RegisterProviderHandler {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    pub async fn execute(
        &self,
        id: ProviderId,
        data: NewProvider,
    ) -> Result<Provider, AccountError> {
        let provider = Provider::new(id, data)?;
        match self.accounts.create_provider(&provider).await {
            Ok(()) => {
                info!(provider_id = %provider.id, "provider registered");
                Ok(provider)
            }
            Err(StoreError::AlreadyExists { id, .. }) => Err(AccountError::AlreadyRegistered(id)),
            Err(err) => Err(err.into()),
        }
    }
}
