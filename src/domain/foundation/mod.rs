//! Foundation value objects shared across the domain.

mod errors;
mod ids;
mod money;
mod timestamp;

pub use errors::{StoreError, ValidationError};
pub use ids::{ClientId, PlanId, ProviderId};
pub use money::Money;
pub use timestamp::Timestamp;
