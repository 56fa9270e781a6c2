//! In-memory account store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::account::{Client, Provider};
use crate::domain::foundation::{ClientId, PlanId, ProviderId, StoreError};
use crate::domain::subscription::SubscriptionEntry;
use crate::ports::AccountStore;

/// Thread-safe in-memory implementation of [`AccountStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    clients: Arc<RwLock<HashMap<ClientId, Client>>>,
    providers: Arc<RwLock<HashMap<ProviderId, Provider>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::backend("lock poisoned")
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get_client(&self, id: &ClientId) -> Result<Option<Client>, StoreError> {
        Ok(self.clients.read().map_err(|_| poisoned())?.get(id).cloned())
    }

    async fn create_client(&self, client: &Client) -> Result<(), StoreError> {
        let mut clients = self.clients.write().map_err(|_| poisoned())?;
        if clients.contains_key(&client.id) {
            return Err(StoreError::already_exists("client", client.id.to_string()));
        }
        clients.insert(client.id.clone(), client.clone());
        Ok(())
    }

    async fn update_client(&self, client: &Client) -> Result<(), StoreError> {
        let mut clients = self.clients.write().map_err(|_| poisoned())?;
        let stored = clients
            .get_mut(&client.id)
            .ok_or_else(|| StoreError::not_found("client", client.id.to_string()))?;

        // Profile fields only; subscriptions and the gateway customer id are
        // owned by their dedicated primitives.
        stored.first_name = client.first_name.clone();
        stored.last_name = client.last_name.clone();
        stored.preferences = client.preferences.clone();
        Ok(())
    }

    async fn add_subscription(
        &self,
        id: &ClientId,
        entry: &SubscriptionEntry,
    ) -> Result<bool, StoreError> {
        let mut clients = self.clients.write().map_err(|_| poisoned())?;
        let client = clients
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("client", id.to_string()))?;
        Ok(client.add_subscription(entry.clone()))
    }

    async fn remove_subscription(
        &self,
        id: &ClientId,
        plan_id: &PlanId,
    ) -> Result<bool, StoreError> {
        let mut clients = self.clients.write().map_err(|_| poisoned())?;
        let client = clients
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("client", id.to_string()))?;
        Ok(client.remove_subscription(plan_id))
    }

    async fn set_gateway_customer(
        &self,
        id: &ClientId,
        customer_id: &str,
    ) -> Result<bool, StoreError> {
        let mut clients = self.clients.write().map_err(|_| poisoned())?;
        let client = clients
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("client", id.to_string()))?;
        if client.gateway_customer_id.is_some() {
            return Ok(false);
        }
        client.gateway_customer_id = Some(customer_id.to_string());
        Ok(true)
    }

    async fn list_clients_with_subscription(
        &self,
        plan_id: &PlanId,
    ) -> Result<Vec<Client>, StoreError> {
        let clients = self.clients.read().map_err(|_| poisoned())?;
        let mut matching: Vec<Client> = clients
            .values()
            .filter(|c| c.has_subscription(plan_id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matching)
    }

    async fn get_provider(&self, id: &ProviderId) -> Result<Option<Provider>, StoreError> {
        Ok(self
            .providers
            .read()
            .map_err(|_| poisoned())?
            .get(id)
            .cloned())
    }

    async fn create_provider(&self, provider: &Provider) -> Result<(), StoreError> {
        let mut providers = self.providers.write().map_err(|_| poisoned())?;
        if providers.contains_key(&provider.id) {
            return Err(StoreError::already_exists(
                "provider",
                provider.id.to_string(),
            ));
        }
        providers.insert(provider.id.clone(), provider.clone());
        Ok(())
    }

    async fn update_provider(&self, provider: &Provider) -> Result<(), StoreError> {
        let mut providers = self.providers.write().map_err(|_| poisoned())?;
        let stored = providers
            .get_mut(&provider.id)
            .ok_or_else(|| StoreError::not_found("provider", provider.id.to_string()))?;

        // Profile fields only; the plan set and merchant id are owned by
        // their dedicated primitives.
        stored.business_name = provider.business_name.clone();
        stored.category = provider.category.clone();
        stored.bio = provider.bio.clone();
        stored.website = provider.website.clone();
        stored.cover_image = provider.cover_image.clone();
        Ok(())
    }

    async fn add_plan(&self, id: &ProviderId, plan_id: &PlanId) -> Result<bool, StoreError> {
        let mut providers = self.providers.write().map_err(|_| poisoned())?;
        let provider = providers
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("provider", id.to_string()))?;
        Ok(provider.add_plan(*plan_id))
    }

    async fn remove_plan(&self, id: &ProviderId, plan_id: &PlanId) -> Result<bool, StoreError> {
        let mut providers = self.providers.write().map_err(|_| poisoned())?;
        let provider = providers
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("provider", id.to_string()))?;
        Ok(provider.remove_plan(plan_id))
    }

    async fn set_merchant_account(
        &self,
        id: &ProviderId,
        merchant_id: &str,
    ) -> Result<bool, StoreError> {
        let mut providers = self.providers.write().map_err(|_| poisoned())?;
        let provider = providers
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("provider", id.to_string()))?;
        Ok(provider.assign_merchant_account(merchant_id))
    }

    async fn list_providers_by_categories(
        &self,
        categories: &[String],
    ) -> Result<Vec<Provider>, StoreError> {
        let providers = self.providers.read().map_err(|_| poisoned())?;
        let mut matching: Vec<Provider> = providers
            .values()
            .filter(|p| categories.is_empty() || categories.contains(&p.category))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{NewClient, NewProvider};
    use std::collections::BTreeSet;

    fn client(id: &str) -> Client {
        Client::new(
            ClientId::new(id).unwrap(),
            NewClient {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                preferences: BTreeSet::new(),
            },
        )
        .unwrap()
    }

    fn provider(id: &str, category: &str) -> Provider {
        Provider::new(
            ProviderId::new(id).unwrap(),
            NewProvider {
                business_name: "Biz".to_string(),
                category: category.to_string(),
                bio: None,
                website: None,
                cover_image: None,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn subscription_entries_are_idempotent() {
        let store = InMemoryAccountStore::new();
        let c = client("c1");
        store.create_client(&c).await.unwrap();

        let plan = PlanId::new();
        let entry = SubscriptionEntry::new(plan);
        assert!(store.add_subscription(&c.id, &entry).await.unwrap());
        assert!(!store.add_subscription(&c.id, &entry).await.unwrap());
        assert!(store.remove_subscription(&c.id, &plan).await.unwrap());
        assert!(!store.remove_subscription(&c.id, &plan).await.unwrap());
    }

    #[tokio::test]
    async fn gateway_customer_first_writer_wins() {
        let store = InMemoryAccountStore::new();
        let c = client("c1");
        store.create_client(&c).await.unwrap();

        assert!(store.set_gateway_customer(&c.id, "cus_a").await.unwrap());
        assert!(!store.set_gateway_customer(&c.id, "cus_b").await.unwrap());

        let got = store.get_client(&c.id).await.unwrap().unwrap();
        assert_eq!(got.gateway_customer_id.as_deref(), Some("cus_a"));
    }

    #[tokio::test]
    async fn stale_client_update_keeps_subscriptions_and_customer_id() {
        let store = InMemoryAccountStore::new();
        let c = client("c1");
        store.create_client(&c).await.unwrap();

        // Snapshot taken before the subscribe flow touched the document.
        let mut stale = store.get_client(&c.id).await.unwrap().unwrap();
        let plan = PlanId::new();
        store.set_gateway_customer(&c.id, "cus_a").await.unwrap();
        store
            .add_subscription(&c.id, &SubscriptionEntry::new(plan))
            .await
            .unwrap();

        stale.first_name = "Grace".to_string();
        store.update_client(&stale).await.unwrap();

        let got = store.get_client(&c.id).await.unwrap().unwrap();
        assert_eq!(got.first_name, "Grace");
        assert_eq!(got.gateway_customer_id.as_deref(), Some("cus_a"));
        assert!(got.has_subscription(&plan));
    }

    #[tokio::test]
    async fn stale_provider_update_keeps_plans_and_merchant_id() {
        let store = InMemoryAccountStore::new();
        let p = provider("p1", "Fitness");
        store.create_provider(&p).await.unwrap();

        let mut stale = store.get_provider(&p.id).await.unwrap().unwrap();
        let plan = PlanId::new();
        store.set_merchant_account(&p.id, "acct_a").await.unwrap();
        store.add_plan(&p.id, &plan).await.unwrap();

        stale.business_name = "Renamed".to_string();
        store.update_provider(&stale).await.unwrap();

        let got = store.get_provider(&p.id).await.unwrap().unwrap();
        assert_eq!(got.business_name, "Renamed");
        assert_eq!(got.gateway_merchant_id.as_deref(), Some("acct_a"));
        assert!(got.plans.contains(&plan));
    }

    #[tokio::test]
    async fn lists_clients_holding_a_plan() {
        let store = InMemoryAccountStore::new();
        let mut a = client("c1");
        let b = client("c2");
        let plan = PlanId::new();
        a.add_subscription(SubscriptionEntry::new(plan));
        store.create_client(&a).await.unwrap();
        store.create_client(&b).await.unwrap();

        let holders = store.list_clients_with_subscription(&plan).await.unwrap();
        assert_eq!(holders.len(), 1);
        assert_eq!(holders[0].id, a.id);
    }

    #[tokio::test]
    async fn lists_providers_by_category() {
        let store = InMemoryAccountStore::new();
        store
            .create_provider(&provider("p1", "Fitness"))
            .await
            .unwrap();
        store
            .create_provider(&provider("p2", "Travel"))
            .await
            .unwrap();

        let fitness = store
            .list_providers_by_categories(&["Fitness".to_string()])
            .await
            .unwrap();
        assert_eq!(fitness.len(), 1);

        let all = store.list_providers_by_categories(&[]).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
