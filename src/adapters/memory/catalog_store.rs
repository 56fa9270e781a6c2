//! In-memory catalog store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::catalog::Plan;
use crate::domain::foundation::{ClientId, PlanId, ProviderId, StoreError};
use crate::ports::CatalogStore;

/// Thread-safe in-memory implementation of [`CatalogStore`].
///
/// Mirrors the guarded-update semantics of the persistent adapter: the
/// boolean mutators decide inside one lock acquisition, so concurrent callers
/// see the same first-writer-wins behavior.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogStore {
    plans: Arc<RwLock<HashMap<PlanId, Plan>>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get_plan(&self, id: &PlanId) -> Result<Option<Plan>, StoreError> {
        let plans = self
            .plans
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        Ok(plans.get(id).cloned())
    }

    async fn list_plans_by_provider(
        &self,
        provider_id: &ProviderId,
    ) -> Result<Vec<Plan>, StoreError> {
        let plans = self
            .plans
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        let mut matching: Vec<Plan> = plans
            .values()
            .filter(|p| &p.provider_id == provider_id)
            .cloned()
            .collect();
        matching.sort_by_key(|p| p.created_at);
        Ok(matching)
    }

    async fn create_plan(&self, plan: &Plan) -> Result<(), StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        if plans.contains_key(&plan.id) {
            return Err(StoreError::already_exists("plan", plan.id.to_string()));
        }
        plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn update_plan(&self, plan: &Plan) -> Result<(), StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        let stored = plans
            .get_mut(&plan.id)
            .ok_or_else(|| StoreError::not_found("plan", plan.id.to_string()))?;

        // Profile fields only. The subscriber set and gateway price id belong
        // to their dedicated primitives; a stale read must never clobber
        // them. Price and cycle change only while the plan is unpriced.
        stored.title = plan.title.clone();
        stored.description = plan.description.clone();
        stored.grace_period_days = plan.grace_period_days;
        if stored.gateway_price_id.is_none() {
            stored.price = plan.price.clone();
            stored.billing_cycle = plan.billing_cycle;
        }
        Ok(())
    }

    async fn set_gateway_price(&self, id: &PlanId, price_id: &str) -> Result<bool, StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        let plan = plans
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("plan", id.to_string()))?;
        if plan.gateway_price_id.is_some() {
            return Ok(false);
        }
        plan.gateway_price_id = Some(price_id.to_string());
        Ok(true)
    }

    async fn add_subscriber(
        &self,
        id: &PlanId,
        client_id: &ClientId,
    ) -> Result<bool, StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        let plan = plans
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("plan", id.to_string()))?;
        Ok(plan.add_subscriber(client_id.clone()))
    }

    async fn remove_subscriber(
        &self,
        id: &PlanId,
        client_id: &ClientId,
    ) -> Result<bool, StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        let plan = plans
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("plan", id.to_string()))?;
        Ok(plan.remove_subscriber(client_id))
    }

    async fn delete_plan(&self, id: &PlanId) -> Result<(), StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        plans.remove(id);
        Ok(())
    }
}
