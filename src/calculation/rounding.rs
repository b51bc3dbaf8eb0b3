//! Currency rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an amount to whole currency units, halves away from zero.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::round_currency;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_currency(Decimal::new(3656, 1)), Decimal::new(366, 0));
/// assert_eq!(round_currency(Decimal::new(4925, 2)), Decimal::new(49, 0));
/// assert_eq!(round_currency(Decimal::new(25, 1)), Decimal::new(3, 0));
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_half_rounds_up() {
        assert_eq!(round_currency(dec("0.5")), dec("1"));
        assert_eq!(round_currency(dec("20999.5")), dec("21000"));
    }

    #[test]
    fn test_below_half_rounds_down() {
        assert_eq!(round_currency(dec("49.2")), dec("49"));
        assert_eq!(round_currency(dec("0.4999")), dec("0"));
    }

    #[test]
    fn test_whole_amounts_unchanged() {
        assert_eq!(round_currency(dec("21000")), dec("21000"));
        assert_eq!(round_currency(Decimal::ZERO), Decimal::ZERO);
    }
}
