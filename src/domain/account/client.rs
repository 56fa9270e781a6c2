//! Client account entity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{ClientId, PlanId, Timestamp, ValidationError};
use crate::domain::subscription::SubscriptionEntry;

/// A client account document.
///
/// The subscription set mirrors the subscriber sets of the plans it names;
/// only the lifecycle coordinator writes either side. A subscription entry is
/// a reference, never a snapshot: plan data is resolved live and dangling
/// references are filtered by readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Client {
    pub id: ClientId,
    pub first_name: String,
    pub last_name: String,
    /// Category preferences used for plan discovery.
    pub preferences: BTreeSet<String>,
    /// Assigned on first payment setup or first subscribe, then reused for
    /// every later gateway call.
    pub gateway_customer_id: Option<String>,
    pub subscriptions: Vec<SubscriptionEntry>,
    pub created_at: Timestamp,
}

/// Validated step-2 signup input for a client.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub preferences: BTreeSet<String>,
}

/// Partial update to client profile fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferences: Option<BTreeSet<String>>,
}

impl Client {
    /// Creates a client account at signup. First and last name are required
    /// step-2 fields.
    pub fn new(id: ClientId, data: NewClient) -> Result<Self, ValidationError> {
        let first_name = data.first_name.trim().to_string();
        if first_name.is_empty() {
            return Err(ValidationError::empty_field("first_name"));
        }
        let last_name = data.last_name.trim().to_string();
        if last_name.is_empty() {
            return Err(ValidationError::empty_field("last_name"));
        }

        Ok(Self {
            id,
            first_name,
            last_name,
            preferences: data.preferences,
            gateway_customer_id: None,
            subscriptions: Vec::new(),
            created_at: Timestamp::now(),
        })
    }

    /// True if the client holds a subscription entry for the plan.
    pub fn has_subscription(&self, plan_id: &PlanId) -> bool {
        self.subscriptions.iter().any(|s| &s.plan_id == plan_id)
    }

    /// Adds a subscription entry. Returns `true` if newly added; adding an
    /// already-present plan is a no-op, not a duplicate.
    pub fn add_subscription(&mut self, entry: SubscriptionEntry) -> bool {
        if self.has_subscription(&entry.plan_id) {
            return false;
        }
        self.subscriptions.push(entry);
        true
    }

    /// Removes the subscription entry for a plan. Returns `true` if present.
    pub fn remove_subscription(&mut self, plan_id: &PlanId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| &s.plan_id != plan_id);
        self.subscriptions.len() != before
    }

    /// Applies a profile patch.
    pub fn apply_patch(&mut self, patch: ClientPatch) -> Result<(), ValidationError> {
        if let Some(first_name) = patch.first_name {
            let first_name = first_name.trim().to_string();
            if first_name.is_empty() {
                return Err(ValidationError::empty_field("first_name"));
            }
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            let last_name = last_name.trim().to_string();
            if last_name.is_empty() {
                return Err(ValidationError::empty_field("last_name"));
            }
            self.last_name = last_name;
        }
        if let Some(preferences) = patch.preferences {
            self.preferences = preferences;
        }
        Ok(())
    }
}
