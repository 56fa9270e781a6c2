//! Subscription entry stored on a client document.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PlanId, Timestamp};

/// One active subscription held by a client.
///
/// Only the plan id and the join time are recorded. Titles and prices are
/// looked up from the plan document on read so the entry never goes stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscriptionEntry {
    pub plan_id: PlanId,
    pub joined_at: Timestamp,
}

impl SubscriptionEntry {
    /// Creates an entry joined now.
    pub fn new(plan_id: PlanId) -> Self {
        Self {
            plan_id,
            joined_at: Timestamp::now(),
        }
    }
}
