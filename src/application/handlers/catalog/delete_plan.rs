//! Delete a plan and cascade the cleanup.

use std::sync::Arc;

use tracing::info;

use crate::domain::catalog::CatalogError;
use crate::domain::foundation::{PlanId, ProviderId};
use crate::ports::{AccountStore, CatalogStore};

/// Deletes a plan after an ownership check.
///
/// The cascade runs in an order that keeps crash remnants harmless:
/// subscriber entries come off the client documents first, then the
/// provider's ownership record, and the plan document itself goes last. A
/// crash mid-cascade leaves entries that readers filter and reconciliation
/// removes, never a deleted plan with live references that cannot be traced.
pub struct DeletePlanHandler {
    catalog: Arc<dyn CatalogStore>,
    accounts: Arc<dyn AccountStore>,
}

impl DeletePlanHandler {
    pub fn new(catalog: Arc<dyn CatalogStore>, accounts: Arc<dyn AccountStore>) -> Self {
        Self { catalog, accounts }
    }

    pub async fn execute(
        &self,
        provider_id: &ProviderId,
        plan_id: &PlanId,
    ) -> Result<(), CatalogError> {
        let plan = self
            .catalog
            .get_plan(plan_id)
            .await?
            .ok_or(CatalogError::PlanNotFound(*plan_id))?;

        if &plan.provider_id != provider_id {
            return Err(CatalogError::NotOwner {
                plan_id: *plan_id,
                provider_id: provider_id.clone(),
            });
        }

        let holders = self.accounts.list_clients_with_subscription(plan_id).await?;
        for client in &holders {
            self.accounts.remove_subscription(&client.id, plan_id).await?;
        }
        self.accounts.remove_plan(provider_id, plan_id).await?;
        self.catalog.delete_plan(plan_id).await?;

        info!(
            %plan_id, %provider_id,
            subscribers = holders.len(),
            "plan deleted with cascade"
        );
        Ok(())
    }
}
