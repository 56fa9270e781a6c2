//! Hosted card-setup flow for clients.

use std::sync::Arc;

use crate::domain::foundation::{ClientId, StoreError};
use crate::domain::subscription::SubscriptionError;
use crate::ports::{AccountStore, PaymentGateway};

/// Ensures the client has a gateway customer and creates a hosted card-setup
/// session. The returned URL is where the client enters card details.
pub struct SetupPaymentHandler {
    accounts: Arc<dyn AccountStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl SetupPaymentHandler {
    pub fn new(accounts: Arc<dyn AccountStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { accounts, gateway }
    }

    pub async fn execute(
        &self,
        client_id: &ClientId,
        email: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String, SubscriptionError> {
        let client = self
            .accounts
            .get_client(client_id)
            .await?
            .ok_or_else(|| SubscriptionError::ClientNotFound(client_id.clone()))?;

        let customer_id = match client.gateway_customer_id {
            Some(id) => id,
            None => {
                let created = self.gateway.create_customer(email).await?;
                if self
                    .accounts
                    .set_gateway_customer(client_id, &created)
                    .await?
                {
                    created
                } else {
                    self.accounts
                        .get_client(client_id)
                        .await?
                        .and_then(|c| c.gateway_customer_id)
                        .ok_or_else(|| {
                            StoreError::invalid_document(
                                "client",
                                client_id.to_string(),
                                "customer assignment lost and not readable",
                            )
                        })?
                }
            }
        };

        let url = self
            .gateway
            .create_card_setup_session(&customer_id, success_url, cancel_url)
            .await?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAccountStore;
    use crate::adapters::stripe::MockGateway;
    use crate::domain::account::{Client, NewClient};
    use std::collections::BTreeSet;

    #[tokio::test]
    async fn assigns_customer_then_reuses_it() {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let gateway = Arc::new(MockGateway::new());
        let client = Client::new(
            ClientId::new("c1").unwrap(),
            NewClient {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                preferences: BTreeSet::new(),
            },
        )
        .unwrap();
        accounts.create_client(&client).await.unwrap();

        let handler = SetupPaymentHandler::new(accounts.clone(), gateway.clone());
        handler
            .execute(&client.id, "a@example.com", "https://ok", "https://no")
            .await
            .unwrap();
        handler
            .execute(&client.id, "a@example.com", "https://ok", "https://no")
            .await
            .unwrap();

        assert_eq!(gateway.customer_creates(), 1);
        let stored = accounts.get_client(&client.id).await.unwrap().unwrap();
        assert!(stored.gateway_customer_id.is_some());
    }
}
