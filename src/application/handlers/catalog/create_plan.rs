//! Create a plan for a provider.

use std::sync::Arc;

use tracing::info;

use crate::domain::catalog::{CatalogError, NewPlan, Plan};
use crate::domain::foundation::ProviderId;
use crate::ports::{AccountStore, CatalogStore};

/// Creates a plan document and records ownership on the provider.
///
/// No gateway call happens here: the recurring price is created lazily when
/// the first subscriber arrives.
pub struct CreatePlanHandler {
    catalog: Arc<dyn CatalogStore>,
    accounts: Arc<dyn AccountStore>,
}

impl CreatePlanHandler {
    pub fn new(catalog: Arc<dyn CatalogStore>, accounts: Arc<dyn AccountStore>) -> Self {
        Self { catalog, accounts }
    }

    pub async fn execute(
        &self,
        provider_id: &ProviderId,
        data: NewPlan,
    ) -> Result<Plan, CatalogError> {
        self.accounts
            .get_provider(provider_id)
            .await?
            .ok_or_else(|| CatalogError::ProviderNotFound(provider_id.clone()))?;

        let plan = Plan::new(provider_id.clone(), data)?;
        self.catalog.create_plan(&plan).await?;
        self.accounts.add_plan(provider_id, &plan.id).await?;

        info!(plan_id = %plan.id, provider_id = %provider_id, "plan created");
        Ok(plan)
    }
}
