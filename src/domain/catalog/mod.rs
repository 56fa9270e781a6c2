//! Catalog domain - plans and their billing terms.

mod billing_cycle;
mod errors;
mod plan;

pub use billing_cycle::BillingCycle;
pub use errors::CatalogError;
pub use plan::{NewPlan, Plan, PlanPatch};
