//! Update a plan's editable fields.

use std::sync::Arc;

use crate::domain::catalog::{CatalogError, Plan, PlanPatch};
use crate::domain::foundation::{PlanId, ProviderId};
use crate::ports::CatalogStore;

/// Applies a patch to a plan after an ownership check. Price and billing
/// cycle edits are refused once the plan has a gateway price.
pub struct UpdatePlanHandler {
    catalog: Arc<dyn CatalogStore>,
}

impl UpdatePlanHandler {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    pub async fn execute(
        &self,
        provider_id: &ProviderId,
        plan_id: &PlanId,
        patch: PlanPatch,
    ) -> Result<Plan, CatalogError> {
        let mut plan = self
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

        plan.apply_patch(patch)?;
        self.catalog.update_plan(&plan).await?;
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCatalogStore;
    use crate::domain::catalog::{BillingCycle, NewPlan};
    use crate::domain::foundation::Money;

    async fn seed_plan(catalog: &InMemoryCatalogStore, provider: &str) -> Plan {
        let plan = Plan::new(
            ProviderId::new(provider).unwrap(),
            NewPlan {
                title: "Weekly Yoga".to_string(),
                description: None,
                price: Money::parse_decimal("10.00", "CAD").unwrap(),
                billing_cycle: BillingCycle::Monthly,
                grace_period_days: 0,
            },
        )
        .unwrap();
        catalog.create_plan(&plan).await.unwrap();
        plan
    }

    #[tokio::test]
    async fn owner_can_edit_title() {
        let catalog = Arc::new(InMemoryCatalogStore::new());
        let plan = seed_plan(&catalog, "p1").await;
        let handler = UpdatePlanHandler::new(catalog.clone());

        let updated = handler
            .execute(
                &ProviderId::new("p1").unwrap(),
                &plan.id,
                PlanPatch {
                    title: Some("Weekly Yoga Plus".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Weekly Yoga Plus");
        let stored = catalog.get_plan(&plan.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Weekly Yoga Plus");
    }

    #[tokio::test]
    async fn non_owner_is_rejected() {
        let catalog = Arc::new(InMemoryCatalogStore::new());
        let plan = seed_plan(&catalog, "p1").await;
        let handler = UpdatePlanHandler::new(catalog);

        let err = handler
            .execute(
                &ProviderId::new("someone-else").unwrap(),
                &plan.id,
                PlanPatch::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotOwner { .. }));
    }

    #[tokio::test]
    async fn price_edit_refused_once_priced() {
        let catalog = Arc::new(InMemoryCatalogStore::new());
        let plan = seed_plan(&catalog, "p1").await;
        catalog.set_gateway_price(&plan.id, "price_1").await.unwrap();
        let handler = UpdatePlanHandler::new(catalog);

        let err = handler
            .execute(
                &ProviderId::new("p1").unwrap(),
                &plan.id,
                PlanPatch {
                    price: Some(Money::parse_decimal("99.00", "CAD").unwrap()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::PriceLocked { .. }));
    }
}
