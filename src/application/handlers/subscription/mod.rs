//! Subscription lifecycle use cases.

mod coordinator;

pub use coordinator::{ReconcileReport, SubscribeOutcome, SubscriptionCoordinator};
