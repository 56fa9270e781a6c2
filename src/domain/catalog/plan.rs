//! Plan entity.
//!
//! A plan is a priced, recurring offering owned by one provider. Its
//! subscriber set is the authoritative inverse of the subscribers' own
//! subscription sets; the coordinator keeps the two mirrored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{BillingCycle, CatalogError};
use crate::domain::foundation::{ClientId, Money, PlanId, ProviderId, Timestamp, ValidationError};

/// A subscription plan document.
///
/// Stored documents are rejected if they carry fields this shape does not
/// declare, rather than trusting whatever the database returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    pub id: PlanId,
    pub provider_id: ProviderId,
    pub title: String,
    pub description: Option<String>,
    pub price: Money,
    pub billing_cycle: BillingCycle,
    /// Days of grace after a missed renewal. Stored-but-unused metadata:
    /// nothing consumes it until a billing-cycle job exists.
    pub grace_period_days: u32,
    /// Assigned lazily when the first subscriber triggers pricing, then
    /// immutable.
    pub gateway_price_id: Option<String>,
    pub subscribers: BTreeSet<ClientId>,
    pub created_at: Timestamp,
}

/// Validated input for creating a plan.
#[derive(Debug, Clone)]
pub struct NewPlan {
    pub title: String,
    pub description: Option<String>,
    pub price: Money,
    pub billing_cycle: BillingCycle,
    pub grace_period_days: u32,
}

/// Partial update to a plan's editable fields.
///
/// `None` leaves a field untouched. Price and billing cycle may only change
/// while the plan has no gateway price.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Money>,
    pub billing_cycle: Option<BillingCycle>,
    pub grace_period_days: Option<u32>,
}

impl Plan {
    /// Creates a new plan for a provider, assigning an id and creation time.
    ///
    /// The subscriber set starts empty and no gateway price exists yet.
    pub fn new(provider_id: ProviderId, data: NewPlan) -> Result<Self, ValidationError> {
        let title = data.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::empty_field("title"));
        }

        Ok(Self {
            id: PlanId::new(),
            provider_id,
            title,
            description: data
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            price: data.price,
            billing_cycle: data.billing_cycle,
            grace_period_days: data.grace_period_days,
            gateway_price_id: None,
            subscribers: BTreeSet::new(),
            created_at: Timestamp::now(),
        })
    }

    /// True once the gateway price has been assigned.
    pub fn is_priced(&self) -> bool {
        self.gateway_price_id.is_some()
    }

    /// Assigns the gateway price id. Fails if one is already set: a priced
    /// plan never changes price under its existing subscribers.
    pub fn assign_gateway_price(&mut self, price_id: impl Into<String>) -> Result<(), CatalogError> {
        if self.gateway_price_id.is_some() {
            return Err(CatalogError::PriceLocked {
                field: "gateway_price_id",
            });
        }
        self.gateway_price_id = Some(price_id.into());
        Ok(())
    }

    /// Adds a subscriber. Returns `true` if newly added, `false` if already
    /// present (idempotent set semantics).
    pub fn add_subscriber(&mut self, client_id: ClientId) -> bool {
        self.subscribers.insert(client_id)
    }

    /// Removes a subscriber. Returns `true` if the client was present.
    pub fn remove_subscriber(&mut self, client_id: &ClientId) -> bool {
        self.subscribers.remove(client_id)
    }

    /// Applies a patch to the editable fields.
    ///
    /// Rejects price and billing-cycle changes once the plan is priced.
    pub fn apply_patch(&mut self, patch: PlanPatch) -> Result<(), CatalogError> {
        if self.is_priced() {
            if patch.price.is_some() {
                return Err(CatalogError::PriceLocked { field: "price" });
            }
            if patch.billing_cycle.is_some() {
                return Err(CatalogError::PriceLocked {
                    field: "billing_cycle",
                });
            }
        }

        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ValidationError::empty_field("title").into());
            }
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty());
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(cycle) = patch.billing_cycle {
            self.billing_cycle = cycle;
        }
        if let Some(days) = patch.grace_period_days {
            self.grace_period_days = days;
        }

        Ok(())
    }
}
