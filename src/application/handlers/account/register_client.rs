//! Client signup.

use std::sync::Arc;

use tracing::info;

use crate::domain::account::{AccountError, Client, NewClient};
use crate::domain::foundation::{ClientId, StoreError};
use crate::ports::AccountStore;

/// Creates the client document for a freshly authenticated account.
///
/// The account id comes from the authentication collaborator; signup step two
/// supplies the profile fields.
pub struct RegisterClientHandler {
    accounts: Arc<dyn AccountStore>,
}

impl RegisterClientHandler {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    pub async fn execute(&self, id: ClientId, data: NewClient) -> Result<Client, AccountError> {
        let client = Client::new(id, data)?;
        match self.accounts.create_client(&client).await {
            Ok(()) => {
                info!(client_id = %client.id, "client registered");
                Ok(client)
            }
            Err(StoreError::AlreadyExists { id, .. }) => Err(AccountError::AlreadyRegistered(id)),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAccountStore;
    use std::collections::BTreeSet;

    fn signup() -> NewClient {
        NewClient {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            preferences: BTreeSet::from(["Fitness".to_string()]),
        }
    }

    #[tokio::test]
    async fn registers_once_then_conflicts() {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let handler = RegisterClientHandler::new(accounts.clone());
        let id = ClientId::new("c1").unwrap();

        handler.execute(id.clone(), signup()).await.unwrap();
        let err = handler.execute(id, signup()).await.unwrap_err();
        assert!(matches!(err, AccountError::AlreadyRegistered(_)));
    }
}
