//! Catalog store port: persistence for plan documents.

use async_trait::async_trait;

use crate::domain::catalog::Plan;
use crate::domain::foundation::{ClientId, PlanId, ProviderId, StoreError};

/// Persistence boundary for the plan catalog.
///
/// Every method touches at most one plan document. Cross-document flows
/// (cascading deletes, the subscriber mirror) are composed in the application
/// layer out of these single-document primitives.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetches a plan by id, `None` if absent.
    async fn get_plan(&self, id: &PlanId) -> Result<Option<Plan>, StoreError>;

    /// Lists every plan owned by a provider.
    async fn list_plans_by_provider(
        &self,
        provider_id: &ProviderId,
    ) -> Result<Vec<Plan>, StoreError>;

    /// Inserts a new plan document. Fails with `AlreadyExists` on id collision.
    async fn create_plan(&self, plan: &Plan) -> Result<(), StoreError>;

    /// Writes a plan's profile fields (title, description, price, billing
    /// cycle, grace period). The subscriber set and gateway price id are
    /// mutated only through their dedicated primitives, so a stale read
    /// passed here cannot clobber them; price and cycle persist only while
    /// the plan is unpriced.
    async fn update_plan(&self, plan: &Plan) -> Result<(), StoreError>;

    /// Assigns the gateway price id if the plan has none yet.
    ///
    /// Returns `true` if this call set the id. `false` means another writer
    /// got there first; the caller re-reads to pick up the winning id.
    async fn set_gateway_price(&self, id: &PlanId, price_id: &str) -> Result<bool, StoreError>;

    /// Adds a client to the plan's subscriber set. Returns `true` if newly
    /// added, `false` if already present.
    async fn add_subscriber(&self, id: &PlanId, client_id: &ClientId)
        -> Result<bool, StoreError>;

    /// Removes a client from the plan's subscriber set. Returns `true` if the
    /// client was present.
    async fn remove_subscriber(
        &self,
        id: &PlanId,
        client_id: &ClientId,
    ) -> Result<bool, StoreError>;

    /// Deletes the plan document. Missing plans are a no-op.
    async fn delete_plan(&self, id: &PlanId) -> Result<(), StoreError>;
}
