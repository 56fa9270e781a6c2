//! Money value object: minor currency units with a fixed currency.
//!
//! Amounts are stored as integer minor units (cents) because that is what the
//! payment gateway bills in; the decimal form exists only at the edges.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A non-negative amount of money in a fixed currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Money {
    /// Amount in minor units (e.g. cents): 10.00 CAD is 1000.
    minor_units: u64,

    /// ISO 4217 currency code, uppercase.
    currency: String,
}

impl Money {
    /// Creates a Money value from minor units.
    pub fn from_minor_units(minor_units: u64, currency: impl Into<String>) -> Result<Self, ValidationError> {
        let currency = currency.into();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::invalid_format(
                "currency",
                "expected a three-letter uppercase code",
            ));
        }
        Ok(Self {
            minor_units,
            currency,
        })
    }

    /// Parses a decimal string like `"10.00"` into minor units.
    ///
    /// Accepts zero, one, or two fractional digits. Negative amounts are
    /// rejected before any parse.
    pub fn parse_decimal(decimal: &str, currency: impl Into<String>) -> Result<Self, ValidationError> {
        let decimal = decimal.trim();
        if decimal.starts_with('-') {
            return Err(ValidationError::below_minimum("price", 0, -1));
        }

        let (whole, frac) = match decimal.split_once('.') {
            Some((w, f)) => (w, f),
            None => (decimal, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(ValidationError::empty_field("price"));
        }
        if frac.len() > 2 {
            return Err(ValidationError::invalid_format(
                "price",
                "at most two fractional digits",
            ));
        }

        let whole_units: u64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| ValidationError::invalid_format("price", "not a decimal number"))?
        };

        let mut frac_units: u64 = if frac.is_empty() {
            0
        } else {
            frac.parse()
                .map_err(|_| ValidationError::invalid_format("price", "not a decimal number"))?
        };
        if frac.len() == 1 {
            frac_units *= 10;
        }

        let minor_units = whole_units
            .checked_mul(100)
            .and_then(|v| v.checked_add(frac_units))
            .ok_or_else(|| ValidationError::invalid_format("price", "amount too large"))?;

        Self::from_minor_units(minor_units, currency)
    }

    /// Amount in minor units.
    pub fn minor_units(&self) -> u64 {
        self.minor_units
    }

    /// Currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02} {}",
            self.minor_units / 100,
            self.minor_units % 100,
            self.currency
        )
    }
}
