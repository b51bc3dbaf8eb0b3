//! Base salary proration.
//!
//! This module provides the functions that prorate a monthly salary by the
//! number of days worked.

use rust_decimal::Decimal;

use crate::error::EngineResult;

use super::{checked_product, round_currency};

/// Full days plus half of the half days, clamped to `last_countable_day`.
///
/// The clamp keeps duplicate or erroneous records from paying for more days
/// than the month has had so far.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::total_days_worked;
/// use rust_decimal::Decimal;
///
/// assert_eq!(total_days_worked(20, 2, 30), Decimal::new(21, 0));
/// assert_eq!(total_days_worked(29, 4, 30), Decimal::new(30, 0));
/// ```
pub fn total_days_worked(full_days: u32, half_days: u32, last_countable_day: u32) -> Decimal {
    let raw = Decimal::from(full_days) + Decimal::from(half_days) * Decimal::new(5, 1);
    raw.min(Decimal::from(last_countable_day))
}

/// Prorates a monthly salary by days worked.
///
/// Computes `round(full_month_salary / total_days_in_month * total_days_worked)`.
/// The division happens before the multiplication, and the result is rounded
/// once to whole currency units. A month with zero days pays nothing.
///
/// # Returns
///
/// The prorated salary, or a `CalculationError` if the product overflows.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_base_salary;
/// use rust_decimal::Decimal;
///
/// let base = calculate_base_salary(Decimal::new(30000, 0), Decimal::new(21, 0), 30).unwrap();
/// assert_eq!(base, Decimal::new(21000, 0));
/// ```
pub fn calculate_base_salary(
    full_month_salary: Decimal,
    total_days_worked: Decimal,
    total_days_in_month: u32,
) -> EngineResult<Decimal> {
    if total_days_in_month == 0 {
        return Ok(Decimal::ZERO);
    }
    let daily = full_month_salary / Decimal::from(total_days_in_month);
    let prorated = checked_product(daily, total_days_worked, "base salary")?;
    Ok(round_currency(prorated))
}
