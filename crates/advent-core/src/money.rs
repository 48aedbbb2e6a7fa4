use std::fmt;

use serde::{Deserialize, Serialize};

/// An amount of money, stored as whole cents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u32);

impl Money {
    /// No money at all.
    pub const ZERO: Money = Money(0);

    /// Create an amount from a number of cents.
    pub const fn from_cents(cents: u32) -> Self {
        Self(cents)
    }

    /// The amount in cents.
    pub const fn cents(self) -> u32 {
        self.0
    }

    /// Subtract `other`, or `None` if that would go negative.
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Add `other`, saturating at the maximum representable amount.
    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_dollars_and_cents() {
        assert_eq!(Money::from_cents(50).to_string(), "$0.50");
        assert_eq!(Money::from_cents(250).to_string(), "$2.50");
        assert_eq!(Money::ZERO.to_string(), "$0.00");
        assert_eq!(Money::from_cents(1205).to_string(), "$12.05");
    }

    #[test]
    fn checked_sub_refuses_overdraft() {
        let fifty = Money::from_cents(50);
        assert_eq!(Money::ZERO.checked_sub(fifty), None);
        assert_eq!(fifty.checked_sub(fifty), Some(Money::ZERO));
    }

    #[test]
    fn deserializes_from_plain_cents() {
        let money: Money = serde_json::from_str("75").unwrap();
        assert_eq!(money.cents(), 75);
    }
}
