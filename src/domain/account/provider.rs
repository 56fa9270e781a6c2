//! Provider account entity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{PlanId, ProviderId, Timestamp, ValidationError};

/// A provider account document.
///
/// The plan set lists the plans the provider owns; catalog operations keep it
/// in step with the plan documents themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Provider {
    pub id: ProviderId,
    pub business_name: String,
    pub category: String,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub cover_image: Option<String>,
    /// Assigned once during gateway onboarding, then immutable.
    pub gateway_merchant_id: Option<String>,
    pub plans: BTreeSet<PlanId>,
    pub created_at: Timestamp,
}

/// Validated step-2 signup input for a provider.
#[derive(Debug, Clone)]
pub struct NewProvider {
    pub business_name: String,
    pub category: String,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub cover_image: Option<String>,
}

/// Partial update to provider profile fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderPatch {
    pub business_name: Option<String>,
    pub category: Option<String>,
    pub bio: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub cover_image: Option<Option<String>>,
}

impl Provider {
    /// Creates a provider account at signup. Business name and category are
    /// required step-2 fields.
    pub fn new(id: ProviderId, data: NewProvider) -> Result<Self, ValidationError> {
        let business_name = data.business_name.trim().to_string();
        if business_name.is_empty() {
            return Err(ValidationError::empty_field("business_name"));
        }
        let category = data.category.trim().to_string();
        if category.is_empty() {
            return Err(ValidationError::empty_field("category"));
        }

        Ok(Self {
            id,
            business_name,
            category,
            bio: trimmed(data.bio),
            website: trimmed(data.website),
            cover_image: trimmed(data.cover_image),
            gateway_merchant_id: None,
            plans: BTreeSet::new(),
            created_at: Timestamp::now(),
        })
    }

    /// True once the gateway merchant account has been assigned.
    pub fn is_onboarded(&self) -> bool {
        self.gateway_merchant_id.is_some()
    }

    /// Assigns the gateway merchant account id. Returns `false` if one is
    /// already set; the first assignment wins.
    pub fn assign_merchant_account(&mut self, merchant_id: impl Into<String>) -> bool {
        if self.gateway_merchant_id.is_some() {
            return false;
        }
        self.gateway_merchant_id = Some(merchant_id.into());
        true
    }

    /// Records plan ownership. Returns `true` if newly added.
    pub fn add_plan(&mut self, plan_id: PlanId) -> bool {
        self.plans.insert(plan_id)
    }

    /// Drops plan ownership. Returns `true` if the plan was present.
    pub fn remove_plan(&mut self, plan_id: &PlanId) -> bool {
        self.plans.remove(plan_id)
    }

    /// Applies a profile patch.
    pub fn apply_patch(&mut self, patch: ProviderPatch) -> Result<(), ValidationError> {
        if let Some(business_name) = patch.business_name {
            let business_name = business_name.trim().to_string();
            if business_name.is_empty() {
                return Err(ValidationError::empty_field("business_name"));
            }
            self.business_name = business_name;
        }
        if let Some(category) = patch.category {
            let category = category.trim().to_string();
            if category.is_empty() {
                return Err(ValidationError::empty_field("category"));
            }
            self.category = category;
        }
        if let Some(bio) = patch.bio {
            self.bio = trimmed(bio);
        }
        if let Some(website) = patch.website {
            self.website = trimmed(website);
        }
        if let Some(cover_image) = patch.cover_image {
            self.cover_image = trimmed(cover_image);
        }
        Ok(())
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> Provider {
        Provider::new(
            ProviderId::new("p1").unwrap(),
            NewProvider {
                business_name: "Sunrise Yoga".to_string(),
                category: "Fitness".to_string(),
                bio: Some("Morning classes".to_string()),
                website: None,
                cover_image: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn new_provider_requires_business_name_and_category() {
        let err = Provider::new(
            ProviderId::new("p1").unwrap(),
            NewProvider {
                business_name: "Sunrise Yoga".to_string(),
                category: "  ".to_string(),
                bio: None,
                website: None,
                cover_image: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyField { .. }));
    }

    #[test]
    fn merchant_account_assigns_once() {
        let mut p = provider();
        assert!(!p.is_onboarded());
        assert!(p.assign_merchant_account("acct_1"));
        assert!(!p.assign_merchant_account("acct_2"));
        assert_eq!(p.gateway_merchant_id.as_deref(), Some("acct_1"));
    }

    #[test]
    fn plan_set_is_idempotent() {
        let mut p = provider();
        let plan = PlanId::new();

        assert!(p.add_plan(plan));
        assert!(!p.add_plan(plan));
        assert!(p.remove_plan(&plan));
        assert!(!p.remove_plan(&plan));
    }

    #[test]
    fn patch_clears_optional_fields() {
        let mut p = provider();
        p.apply_patch(ProviderPatch {
            bio: Some(None),
            website: Some(Some("https://sunrise.example".to_string())),
            ..Default::default()
        })
        .unwrap();

        assert!(p.bio.is_none());
        assert_eq!(p.website.as_deref(), Some("https://sunrise.example"));
    }
}
