//! Value objects for the purchase domain.

use std::str::FromStr;

use common::entity_id;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

entity_id!(
    /// Unique identifier for a purchase transaction.
    PurchaseTransactionId
);

entity_id!(
    /// Unique identifier for a line item within a purchase transaction.
    LineItemId
);

entity_id!(
    /// Unique identifier for a store.
    StoreId
);

/// Price of a line item, in cents to avoid floating point issues.
///
/// Always non-negative. Deserialization runs the same check as
/// [`Price::from_cents`], so an invalid price cannot be constructed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Price {
    cents: i64,
}

impl Price {
    /// Creates a price from an amount in cents.
    pub fn from_cents(cents: i64) -> Result<Self, ValidationError> {
        if cents < 0 {
            return Err(ValidationError::NegativePrice { cents });
        }
        Ok(Self { cents })
    }

    /// Returns a zero price.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the whole-unit portion.
    pub fn units(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after whole units).
    pub fn cents_part(&self) -> i64 {
        self.cents % 100
    }

    /// Adds two prices, saturating at the maximum representable amount.
    pub fn saturating_add(self, other: Price) -> Price {
        Price {
            cents: self.cents.saturating_add(other.cents),
        }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.units(), self.cents_part())
    }
}

impl TryFrom<i64> for Price {
    type Error = ValidationError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Price::from_cents(cents)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.cents
    }
}

impl FromStr for Price {
    type Err = ValidationError;

    /// Parses a decimal amount such as `"9.99"`, `"12"` or `"0.5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ValidationError::MalformedPrice(s.to_string());
        let trimmed = s.trim();

        if let Some(rest) = trimmed.strip_prefix('-') {
            let price: Price = rest.parse().map_err(|_| malformed())?;
            return Err(ValidationError::NegativePrice {
                cents: -price.cents,
            });
        }

        let (units, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        if units.is_empty()
            || fraction.len() > 2
            || !units.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let units: i64 = units.parse().map_err(|_| malformed())?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| malformed())? * 10,
            _ => fraction.parse().map_err(|_| malformed())?,
        };

        units
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or_else(malformed)
            .and_then(Price::from_cents)
    }
}
