//! Exact monetary amount conversion.
//!
//! Amounts are `rust_decimal::Decimal` in the domain and integer minor units
//! (cents) in storage. Both representations are exact; no floating-point
//! type ever appears on the money path. Conversion rejects amounts with more
//! precision than the storage scale instead of silently rounding.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::MONEY_SCALE;
use crate::errors::{AppError, AppResult};

/// Convert a decimal amount into storage minor units (scale 2).
///
/// Fails with a validation error if the amount carries sub-cent precision
/// or overflows the storage range.
pub fn to_minor_units(amount: Decimal) -> AppResult<i64> {
    if amount != amount.round_dp(MONEY_SCALE) {
        return Err(AppError::validation(format!(
            "Amount {} has more than {} decimal places",
            amount, MONEY_SCALE
        )));
    }

    let factor = Decimal::from(10i64.pow(MONEY_SCALE));
    amount
        .checked_mul(factor)
        .and_then(|v| v.to_i64())
        .ok_or_else(|| AppError::validation(format!("Amount {} is out of range", amount)))
}

/// Convert storage minor units back into a decimal amount.
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, MONEY_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn round_trips_exactly() {
        for s in ["0", "0.01", "-0.01", "12345.67", "-99999999.99", "10"] {
            let amount = Decimal::from_str(s).unwrap();
            let minor = to_minor_units(amount).unwrap();
            assert_eq!(from_minor_units(minor), amount.round_dp(MONEY_SCALE));
        }
    }

    #[test]
    fn zero_maps_to_zero() {
        assert_eq!(to_minor_units(Decimal::ZERO).unwrap(), 0);
        assert_eq!(from_minor_units(0), Decimal::new(0, MONEY_SCALE));
    }

    #[test]
    fn rejects_sub_cent_precision() {
        let amount = Decimal::from_str("1.005").unwrap();
        assert!(to_minor_units(amount).is_err());
    }

    #[test]
    fn rejects_out_of_range() {
        let amount = Decimal::MAX;
        assert!(to_minor_units(amount).is_err());
    }

    #[test]
    fn negative_amounts_are_exact() {
        let amount = Decimal::from_str("-42.42").unwrap();
        assert_eq!(to_minor_units(amount).unwrap(), -4242);
        assert_eq!(from_minor_units(-4242), amount);
    }
}
