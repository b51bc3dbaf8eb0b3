//! Travel allowance calculation.

use rust_decimal::Decimal;

use crate::error::EngineResult;

use super::{checked_product, checked_sum, round_currency};

/// Calculates the travel allowance for car and bike distances.
///
/// Each vehicle's amount is rounded on its own and the two rounded amounts are
/// added: `round(car_km * car_rate) + round(bike_km * bike_rate)`. Rounding
/// the sum once instead can differ by one unit, so the order is fixed.
///
/// # Returns
///
/// The allowance, or a `CalculationError` if an amount overflows.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_travel_allowance;
/// use rust_decimal::Decimal;
///
/// let ta = calculate_travel_allowance(
///     Decimal::new(457, 1),
///     Decimal::new(123, 1),
///     Decimal::new(8, 0),
///     Decimal::new(4, 0),
/// )
/// .unwrap();
/// assert_eq!(ta, Decimal::new(415, 0));
/// ```
pub fn calculate_travel_allowance(
    car_distance_km: Decimal,
    bike_distance_km: Decimal,
    car_rate: Decimal,
    bike_rate: Decimal,
) -> EngineResult<Decimal> {
    let car = checked_product(car_distance_km, car_rate, "car travel allowance")?;
    let bike = checked_product(bike_distance_km, bike_rate, "bike travel allowance")?;
    checked_sum([round_currency(car), round_currency(bike)], "travel allowance")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_car_and_bike_rounded_independently() {
        // 45.7 * 8 = 365.6 -> 366, 12.3 * 4 = 49.2 -> 49
        assert_eq!(
            calculate_travel_allowance(dec("45.7"), dec("12.3"), dec("8"), dec("4")).unwrap(),
            dec("415")
        );
    }

    #[test]
    fn test_independent_rounding_differs_from_rounding_the_sum() {
        // 0.4 + 0.4 would round to 1 if summed first; each rounds to 0.
        assert_eq!(
            calculate_travel_allowance(dec("0.1"), dec("0.1"), dec("4"), dec("4")).unwrap(),
            dec("0")
        );
        // 0.5 + 0.5 rounds each half up.
        assert_eq!(
            calculate_travel_allowance(dec("0.5"), dec("0.5"), dec("1"), dec("1")).unwrap(),
            dec("2")
        );
    }

    #[test]
    fn test_missing_car_rate_contributes_nothing() {
        assert_eq!(
            calculate_travel_allowance(dec("120"), dec("10"), dec("0"), dec("3")).unwrap(),
            dec("30")
        );
    }

    #[test]
    fn test_no_travel_pays_nothing() {
        assert_eq!(
            calculate_travel_allowance(dec("0"), dec("0"), dec("8"), dec("4")).unwrap(),
            dec("0")
        );
    }

    #[test]
    fn test_oversized_distance_is_calculation_error() {
        let result = calculate_travel_allowance(
            dec("100000000000000000"),
            dec("0"),
            dec("100000000000000"),
            dec("4"),
        );
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }
}
