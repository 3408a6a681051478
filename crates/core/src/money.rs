//! # Money Module
//!
//! Monetary amounts are plain `rust_decimal::Decimal` values in a single
//! implicit currency. The engine does no currency conversion, so there is
//! no currency tag to carry around.
//!
//! Amounts are stored as TEXT so that sums stay exact.

use crate::error::{CoreError, CoreResult};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Reject a negative amount for the named field.
///
/// # Examples
/// ```
/// use budgetgov_core::ensure_non_negative;
/// use rust_decimal::Decimal;
///
/// assert!(ensure_non_negative("amount", Decimal::ZERO).is_ok());
/// assert!(ensure_non_negative("amount", Decimal::NEGATIVE_ONE).is_err());
/// ```
pub fn ensure_non_negative(field: &str, amount: Decimal) -> CoreResult<Decimal> {
    if amount < Decimal::ZERO {
        return Err(CoreError::negative(field, amount));
    }
    Ok(amount)
}

/// Parse an amount from its stored/text form
pub fn parse_amount(raw: &str) -> CoreResult<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|e| CoreError::InvalidAmount(format!("{}: {}", raw, e)))
}

/// Sum amounts exactly; fails instead of wrapping past `Decimal::MAX`
pub fn sum<I>(amounts: I) -> CoreResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, a| acc.checked_add(a))
        .ok_or(CoreError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ensure_non_negative() {
        assert_eq!(ensure_non_negative("amount", dec!(10.50)).unwrap(), dec!(10.50));
        assert_eq!(ensure_non_negative("amount", dec!(0)).unwrap(), dec!(0));

        let err = ensure_non_negative("new_amount", dec!(-1)).unwrap_err();
        assert!(err.to_string().contains("new_amount"));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1000").unwrap(), dec!(1000));
        assert_eq!(parse_amount(" 12.345 ").unwrap(), dec!(12.345));
        assert!(parse_amount("ten").is_err());
    }

    #[test]
    fn test_sum_is_exact() {
        let total = sum(vec![dec!(0.1), dec!(0.2), dec!(0.3)]).unwrap();
        assert_eq!(total, dec!(0.6));
        assert_eq!(sum(Vec::new()).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        let half = dec!(50000000000000000000000000000);
        let err = sum(vec![half, half]).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow));

        assert_eq!(sum(vec![Decimal::MAX, Decimal::ZERO]).unwrap(), Decimal::MAX);
    }
}
