//! Catalog operation errors.

use thiserror::Error;

use crate::domain::foundation::{PlanId, ProviderId, StoreError, ValidationError};

/// Errors from catalog operations (plan create/update/delete).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Plan not found: {0}")]
    PlanNotFound(PlanId),

    #[error("Provider not found: {0}")]
    ProviderNotFound(ProviderId),

    #[error("Plan {plan_id} is not owned by provider {provider_id}")]
    NotOwner {
        plan_id: PlanId,
        provider_id: ProviderId,
    },

    /// Price, billing cycle, and gateway price id are frozen once the plan
    /// has a gateway price. Changing terms means publishing a new plan.
    #[error("Field '{field}' is locked once the plan has a gateway price")]
    PriceLocked { field: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}
