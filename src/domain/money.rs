use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of minor units (paise, cents) in one major currency unit.
pub const MINOR_UNITS_PER_MAJOR: u64 = 100;

/// A course price in whole major currency units.
///
/// Prices are never negative; a price of zero marks a free course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub u64);

impl Price {
    pub const ZERO: Self = Self(0);

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strictly positive payable amount in minor units, as sent to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorAmount(u64);

impl MinorAmount {
    /// Converts a cart total into minor units, rejecting zero and overflow.
    pub fn from_total(total: Price) -> Result<Self, PaymentError> {
        if total == Price::ZERO {
            return Err(PaymentError::InvalidAmount(total.value()));
        }
        total
            .value()
            .checked_mul(MINOR_UNITS_PER_MAJOR)
            .map(Self)
            .ok_or(PaymentError::InvalidAmount(total.value()))
    }

    pub fn new(value: u64) -> Result<Self, PaymentError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(PaymentError::InvalidAmount(value))
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The amount in major units with two decimal places, e.g. `2000` -> `20.00`.
    pub fn to_major(&self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_minor_amount_from_total() {
        let amount = MinorAmount::from_total(Price(2000)).unwrap();
        assert_eq!(amount.value(), 200_000);
        assert_eq!(amount.to_major(), dec!(2000.00));
    }

    #[test]
    fn test_minor_amount_rejects_zero_and_overflow() {
        assert!(matches!(
            MinorAmount::from_total(Price::ZERO),
            Err(PaymentError::InvalidAmount(0))
        ));
        assert!(matches!(
            MinorAmount::from_total(Price(u64::MAX)),
            Err(PaymentError::InvalidAmount(_))
        ));
        assert!(MinorAmount::new(0).is_err());
    }

    #[test]
    fn test_minor_amount_renders_two_decimals() {
        let amount = MinorAmount::new(2000).unwrap();
        assert_eq!(amount.to_major().to_string(), "20.00");
    }

    #[test]
    fn test_price_checked_add() {
        assert_eq!(Price(500).checked_add(Price(1500)), Some(Price(2000)));
        assert_eq!(Price(u64::MAX).checked_add(Price(1)), None);
    }

    #[test]
    fn test_to_major_covers_full_range() {
        let amount = MinorAmount::new(u64::MAX).unwrap();
        assert_eq!(amount.to_major(), dec!(184467440737095516.15));
        assert!(amount.to_major().is_sign_positive());
    }
}
