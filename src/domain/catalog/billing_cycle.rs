//! Billing cycle encoding.
//!
//! Cycles are stored and transported as the literal strings the catalog has
//! always used: `"monthly"`, `"annually"`, or `"<n> weeks"` for custom cycles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// How often a plan bills.
///
/// A custom cycle is an integer count of weeks. Zero weeks is storable
/// metadata (the catalog form allows it) but cannot be priced at the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BillingCycle {
    Monthly,
    Annually,
    CustomWeeks(u32),
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingCycle::Monthly => write!(f, "monthly"),
            BillingCycle::Annually => write!(f, "annually"),
            BillingCycle::CustomWeeks(n) => write!(f, "{} weeks", n),
        }
    }
}

impl From<BillingCycle> for String {
    fn from(cycle: BillingCycle) -> Self {
        cycle.to_string()
    }
}

impl FromStr for BillingCycle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "monthly" => Ok(BillingCycle::Monthly),
            "annually" => Ok(BillingCycle::Annually),
            other => {
                let weeks = other
                    .strip_suffix(" weeks")
                    .or_else(|| other.strip_suffix(" week"))
                    .ok_or_else(|| {
                        ValidationError::invalid_format(
                            "billing_cycle",
                            "expected 'monthly', 'annually', or '<n> weeks'",
                        )
                    })?;
                let n: u32 = weeks.trim().parse().map_err(|_| {
                    ValidationError::invalid_format("billing_cycle", "week count is not a number")
                })?;
                Ok(BillingCycle::CustomWeeks(n))
            }
        }
    }
}

impl TryFrom<String> for BillingCycle {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
