//! Listing a client's stored cards.

use std::sync::Arc;

use crate::domain::foundation::ClientId;
use crate::domain::subscription::SubscriptionError;
use crate::ports::{AccountStore, PaymentGateway, PaymentMethod};

/// Lists the cards stored on a client's gateway customer. A client with no
/// customer yet simply has no cards.
pub struct PaymentMethodsHandler {
    accounts: Arc<dyn AccountStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentMethodsHandler {
    pub fn new(accounts: Arc<dyn AccountStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { accounts, gateway }
    }

    pub async fn execute(
        &self,
        client_id: &ClientId,
    ) -> Result<Vec<PaymentMethod>, SubscriptionError> {
        let client = self
            .accounts
            .get_client(client_id)
            .await?
            .ok_or_else(|| SubscriptionError::ClientNotFound(client_id.clone()))?;

        match client.gateway_customer_id {
            Some(customer_id) => Ok(self.gateway.list_payment_methods(&customer_id).await?),
            None => Ok(Vec::new()),
        }
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
    async fn no_customer_means_no_cards() {
        let accounts = Arc::new(InMemoryAccountStore::new());
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

        let handler = PaymentMethodsHandler::new(accounts, Arc::new(MockGateway::new()));
        let cards = handler.execute(&client.id).await.unwrap();
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn lists_cards_on_the_customer() {
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
        accounts
            .set_gateway_customer(&client.id, "cus_1")
            .await
            .unwrap();
        gateway.put_payment_method(
            "cus_1",
            PaymentMethod {
                id: "pm_1".to_string(),
                brand: "visa".to_string(),
                last4: "4242".to_string(),
                exp_month: 12,
                exp_year: 2030,
            },
        );

        let handler = PaymentMethodsHandler::new(accounts, gateway);
        let cards = handler.execute(&client.id).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].last4, "4242");
    }
}
