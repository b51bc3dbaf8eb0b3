//! Dearness allowance calculation.

use rust_decimal::Decimal;

use crate::error::EngineResult;

use super::{checked_product, checked_sum, round_currency};

/// Calculates the dearness allowance for a month.
///
/// Full days earn the daily rate and half days earn half of it. The total is
/// capped at the daily rate times `last_countable_day`, then rounded to whole
/// currency units.
///
/// # Returns
///
/// The allowance, or a `CalculationError` if the daily rate is so large that
/// the month's amount overflows.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_dearness_allowance;
/// use rust_decimal::Decimal;
///
/// let da = calculate_dearness_allowance(Decimal::new(100, 0), 20, 2, 30).unwrap();
/// assert_eq!(da, Decimal::new(2100, 0));
/// ```
pub fn calculate_dearness_allowance(
    daily_dearness_allowance: Decimal,
    full_days: u32,
    half_days: u32,
    last_countable_day: u32,
) -> EngineResult<Decimal> {
    const WHAT: &str = "dearness allowance";
    let daily = daily_dearness_allowance;
    let full = checked_product(daily, Decimal::from(full_days), WHAT)?;
    let half = checked_product(daily / Decimal::TWO, Decimal::from(half_days), WHAT)?;
    let earned = checked_sum([full, half], WHAT)?;
    let cap = checked_product(daily, Decimal::from(last_countable_day), WHAT)?;
    Ok(round_currency(earned.min(cap)))
}
