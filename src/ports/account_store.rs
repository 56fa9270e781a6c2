//! Account store port: persistence for client and provider documents.

use async_trait::async_trait;

use crate::domain::account::{Client, Provider};
use crate::domain::foundation::{ClientId, PlanId, ProviderId, StoreError};
use crate::domain::subscription::SubscriptionEntry;

/// Persistence boundary for client and provider accounts.
///
/// Like the catalog store, each method writes at most one document. The
/// boolean-returning mutators are idempotent set operations so retried or
/// concurrent calls converge on the same document state.
#[async_trait]
pub trait AccountStore: Send + Sync {
    // Clients.

    /// Fetches a client by id, `None` if absent.
    async fn get_client(&self, id: &ClientId) -> Result<Option<Client>, StoreError>;

    /// Inserts a new client document. Fails with `AlreadyExists` on collision.
    async fn create_client(&self, client: &Client) -> Result<(), StoreError>;

    /// Writes a client's profile fields (name, preferences). Subscriptions
    /// and the gateway customer id are mutated only through their dedicated
    /// primitives, so a stale read passed here cannot clobber them.
    async fn update_client(&self, client: &Client) -> Result<(), StoreError>;

    /// Adds a subscription entry to the client. Returns `true` if newly
    /// added, `false` if an entry for the same plan already exists.
    async fn add_subscription(
        &self,
        id: &ClientId,
        entry: &SubscriptionEntry,
    ) -> Result<bool, StoreError>;

    /// Removes the subscription entry for a plan. Returns `true` if present.
    async fn remove_subscription(
        &self,
        id: &ClientId,
        plan_id: &PlanId,
    ) -> Result<bool, StoreError>;

    /// Assigns the gateway customer id if the client has none yet. Returns
    /// `true` if this call set it; on `false` the caller re-reads the winner.
    async fn set_gateway_customer(
        &self,
        id: &ClientId,
        customer_id: &str,
    ) -> Result<bool, StoreError>;

    /// Lists every client whose subscription set references the plan. Used by
    /// the delete cascade and by reconciliation.
    async fn list_clients_with_subscription(
        &self,
        plan_id: &PlanId,
    ) -> Result<Vec<Client>, StoreError>;

    // Providers.

    /// Fetches a provider by id, `None` if absent.
    async fn get_provider(&self, id: &ProviderId) -> Result<Option<Provider>, StoreError>;

    /// Inserts a new provider document. Fails with `AlreadyExists` on
    /// collision.
    async fn create_provider(&self, provider: &Provider) -> Result<(), StoreError>;

    /// Writes a provider's profile fields (business name, category, bio,
    /// website, cover image). The plan set and merchant id are mutated only
    /// through their dedicated primitives.
    async fn update_provider(&self, provider: &Provider) -> Result<(), StoreError>;

    /// Records plan ownership on the provider. Returns `true` if newly added.
    async fn add_plan(&self, id: &ProviderId, plan_id: &PlanId) -> Result<bool, StoreError>;

    /// Drops plan ownership from the provider. Returns `true` if present.
    async fn remove_plan(&self, id: &ProviderId, plan_id: &PlanId) -> Result<bool, StoreError>;

    /// Assigns the gateway merchant id if the provider has none yet. Returns
    /// `true` if this call set it.
    async fn set_merchant_account(
        &self,
        id: &ProviderId,
        merchant_id: &str,
    ) -> Result<bool, StoreError>;

    /// Lists providers whose category is one of the given categories. An
    /// empty filter lists every provider.
    async fn list_providers_by_categories(
        &self,
        categories: &[String],
    ) -> Result<Vec<Provider>, StoreError>;
}
