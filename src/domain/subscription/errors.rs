//! Subscription lifecycle errors.

use thiserror::Error;

use crate::domain::foundation::{ClientId, PlanId, StoreError, ValidationError};

/// Errors from the subscription lifecycle coordinator.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    #[error("Plan not found: {0}")]
    PlanNotFound(PlanId),

    /// The gateway could not be reached or answered with a transient failure.
    /// Safe to retry; no local state changed on the failing step.
    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// The gateway refused the request. Retrying the same request will not
    /// help.
    #[error("Payment gateway rejected the request: {0}")]
    GatewayRejected(String),

    /// The two sides of the subscriber mirror disagree and could not be
    /// repaired in place.
    #[error("Consistency violation for client {client_id} and plan {plan_id}: {detail}")]
    Consistency {
        client_id: ClientId,
        plan_id: PlanId,
        detail: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}
