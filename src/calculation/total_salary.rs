//! Total salary calculation.
//!
//! Combines base salary, travel allowance, dearness allowance and approved
//! expenses into a [`SalaryBreakdown`], recording an audit step for each
//! component.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, AuditTrace, AuditWarning, PayMonth, SalaryBreakdown, SalaryRow};

use super::{
    calculate_base_salary, calculate_dearness_allowance, calculate_travel_allowance,
    checked_sum, round_currency, total_days_worked,
};

/// Warning code emitted when recorded days exceed the countable days.
pub const DAYS_WORKED_CLAMPED: &str = "DAYS_WORKED_CLAMPED";

/// Calculates the total salary for one row in the given month.
///
/// `today` decides how much of the month is countable: all of a past month,
/// up to yesterday for the current month, nothing for a future month.
///
/// # Returns
///
/// The breakdown of every component and its audit trace, a `Validation`
/// error if `month` is not 1 to 12, or a `CalculationError` if an amount
/// overflows.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_total_salary;
/// use payroll_engine::models::SalaryRow;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let row = SalaryRow {
///     employee_id: "emp_001".to_string(),
///     employee_name: "Asha Rao".to_string(),
///     full_month_salary: Decimal::new(30000, 0),
///     dearness_allowance: Decimal::new(100, 0),
///     full_days: 20,
///     half_days: 2,
///     distance_travelled_by_car: Decimal::new(457, 1),
///     distance_travelled_by_bike: Decimal::new(123, 1),
///     price_per_km_car: Decimal::new(8, 0),
///     price_per_km_bike: Decimal::new(4, 0),
///     approved_expense: Decimal::new(500, 0),
/// };
///
/// // April 2026 has 30 days and is fully in the past on 2026-05-02.
/// let today = NaiveDate::from_ymd_opt(2026, 5, 2).unwrap();
/// let breakdown = calculate_total_salary(&row, 2026, 4, today).unwrap();
///
/// assert_eq!(breakdown.base_salary, Decimal::new(21000, 0));
/// assert_eq!(breakdown.travel_allowance, Decimal::new(415, 0));
/// assert_eq!(breakdown.dearness_allowance, Decimal::new(2100, 0));
/// assert_eq!(breakdown.total_salary, Decimal::new(24015, 0));
/// ```
pub fn calculate_total_salary(
    row: &SalaryRow,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> EngineResult<SalaryBreakdown> {
    let pay_month = PayMonth::new(year, month)?;
    let days_in_month = pay_month.days_in_month();
    let last_countable_day = pay_month.last_countable_day(today);

    let mut steps = Vec::with_capacity(5);
    let mut warnings = Vec::new();

    // Step 1: days worked
    let raw_days = row.raw_days_worked();
    let days_worked = total_days_worked(row.full_days, row.half_days, last_countable_day);
    let clamped = days_worked < raw_days;
    if clamped {
        warnings.push(AuditWarning {
            code: DAYS_WORKED_CLAMPED.to_string(),
            message: format!(
                "Employee '{}' has {} recorded days but only {} are countable in {}",
                row.employee_id,
                raw_days.normalize(),
                last_countable_day,
                pay_month
            ),
            severity: "low".to_string(),
        });
    }
    steps.push(AuditStep {
        step_number: 1,
        rule_id: "days_worked".to_string(),
        rule_name: "Days Worked".to_string(),
        input: serde_json::json!({
            "full_days": row.full_days,
            "half_days": row.half_days,
            "last_countable_day": last_countable_day
        }),
        output: serde_json::json!({
            "total_days_worked": days_worked.normalize().to_string(),
            "clamped": clamped
        }),
        reasoning: if clamped {
            format!(
                "{} full + {} half days = {} (clamped to {} countable days)",
                row.full_days,
                row.half_days,
                raw_days.normalize(),
                last_countable_day
            )
        } else {
            format!(
                "{} full + {} half days = {}",
                row.full_days,
                row.half_days,
                days_worked.normalize()
            )
        },
    });

    // Step 2: base salary
    let base_salary = calculate_base_salary(row.full_month_salary, days_worked, days_in_month)?;
    steps.push(AuditStep {
        step_number: 2,
        rule_id: "base_salary".to_string(),
        rule_name: "Base Salary Proration".to_string(),
        input: serde_json::json!({
            "full_month_salary": row.full_month_salary.normalize().to_string(),
            "total_days_worked": days_worked.normalize().to_string(),
            "days_in_month": days_in_month
        }),
        output: serde_json::json!({
            "base_salary": base_salary.to_string()
        }),
        reasoning: format!(
            "round({} / {} × {}) = {}",
            row.full_month_salary.normalize(),
            days_in_month,
            days_worked.normalize(),
            base_salary
        ),
    });

    // Step 3: travel allowance
    let travel_allowance = calculate_travel_allowance(
        row.distance_travelled_by_car,
        row.distance_travelled_by_bike,
        row.price_per_km_car,
        row.price_per_km_bike,
    )?;
    steps.push(AuditStep {
        step_number: 3,
        rule_id: "travel_allowance".to_string(),
        rule_name: "Travel Allowance".to_string(),
        input: serde_json::json!({
            "car_km": row.distance_travelled_by_car.normalize().to_string(),
            "bike_km": row.distance_travelled_by_bike.normalize().to_string(),
            "car_rate": row.price_per_km_car.normalize().to_string(),
            "bike_rate": row.price_per_km_bike.normalize().to_string()
        }),
        output: serde_json::json!({
            "travel_allowance": travel_allowance.to_string()
        }),
        reasoning: format!(
            "round({} km × {}) + round({} km × {}) = {}",
            row.distance_travelled_by_car.normalize(),
            row.price_per_km_car.normalize(),
            row.distance_travelled_by_bike.normalize(),
            row.price_per_km_bike.normalize(),
            travel_allowance
        ),
    });

    // Step 4: dearness allowance
    let dearness_allowance = calculate_dearness_allowance(
        row.dearness_allowance,
        row.full_days,
        row.half_days,
        last_countable_day,
    )?;
    steps.push(AuditStep {
        step_number: 4,
        rule_id: "dearness_allowance".to_string(),
        rule_name: "Dearness Allowance".to_string(),
        input: serde_json::json!({
            "daily_rate": row.dearness_allowance.normalize().to_string(),
            "full_days": row.full_days,
            "half_days": row.half_days,
            "last_countable_day": last_countable_day
        }),
        output: serde_json::json!({
            "dearness_allowance": dearness_allowance.to_string()
        }),
        reasoning: format!(
            "min({} × {} + {} × {} / 2, {} × {}) = {}",
            row.dearness_allowance.normalize(),
            row.full_days,
            row.dearness_allowance.normalize(),
            row.half_days,
            row.dearness_allowance.normalize(),
            last_countable_day,
            dearness_allowance
        ),
    });

    // Step 5: total
    let components = [base_salary, travel_allowance, dearness_allowance, row.approved_expense];
    let total_salary = round_currency(checked_sum(components, "total salary")?);
    steps.push(AuditStep {
        step_number: 5,
        rule_id: "total_salary".to_string(),
        rule_name: "Total Salary".to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.to_string(),
            "travel_allowance": travel_allowance.to_string(),
            "dearness_allowance": dearness_allowance.to_string(),
            "approved_expense": row.approved_expense.normalize().to_string()
        }),
        output: serde_json::json!({
            "total_salary": total_salary.to_string()
        }),
        reasoning: format!(
            "{} + {} + {} + {} = {}",
            base_salary,
            travel_allowance,
            dearness_allowance,
            row.approved_expense.normalize(),
            total_salary
        ),
    });

    Ok(SalaryBreakdown {
        days_in_month,
        last_countable_day,
        total_days_worked: days_worked,
        base_salary,
        travel_allowance,
        dearness_allowance,
        approved_expense: row.approved_expense,
        total_salary,
        audit_trace: AuditTrace { steps, warnings },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_row(full_days: u32, half_days: u32) -> SalaryRow {
        SalaryRow {
            employee_id: "emp_001".to_string(),
            employee_name: "Asha Rao".to_string(),
            full_month_salary: dec("30000"),
            dearness_allowance: dec("100"),
            full_days,
            half_days,
            distance_travelled_by_car: dec("45.7"),
            distance_travelled_by_bike: dec("12.3"),
            price_per_km_car: dec("8"),
            price_per_km_bike: dec("4"),
            approved_expense: dec("0"),
        }
    }

    #[test]
    fn test_completed_month_totals_every_component() {
        let breakdown =
            calculate_total_salary(&create_row(20, 2), 2026, 4, date(2026, 5, 2)).unwrap();

        assert_eq!(breakdown.days_in_month, 30);
        assert_eq!(breakdown.last_countable_day, 30);
        assert_eq!(breakdown.total_days_worked, dec("21"));
        assert_eq!(breakdown.base_salary, dec("21000"));
        assert_eq!(breakdown.travel_allowance, dec("415"));
        assert_eq!(breakdown.dearness_allowance, dec("2100"));
        assert_eq!(breakdown.total_salary, dec("23515"));
        assert!(breakdown.audit_trace.warnings.is_empty());
    }

    #[test]
    fn test_approved_expense_is_added() {
        let mut row = create_row(20, 2);
        row.approved_expense = dec("749.5");

        let breakdown = calculate_total_salary(&row, 2026, 4, date(2026, 5, 2)).unwrap();

        // 23515 + 749.5 = 24264.5 -> 24265
        assert_eq!(breakdown.total_salary, dec("24265"));
    }

    #[test]
    fn test_current_month_clamps_days_and_caps_da() {
        // Today is 2026-04-11: only 10 days are countable.
        let breakdown =
            calculate_total_salary(&create_row(11, 2), 2026, 4, date(2026, 4, 11)).unwrap();

        assert_eq!(breakdown.last_countable_day, 10);
        assert_eq!(breakdown.total_days_worked, dec("10"));
        // 30000 / 30 * 10
        assert_eq!(breakdown.base_salary, dec("10000"));
        // min(1100 + 100, 1000)
        assert_eq!(breakdown.dearness_allowance, dec("1000"));
        assert_eq!(breakdown.audit_trace.warnings.len(), 1);
        assert_eq!(breakdown.audit_trace.warnings[0].code, DAYS_WORKED_CLAMPED);
    }

    #[test]
    fn test_future_month_pays_only_travel_and_expenses() {
        let breakdown =
            calculate_total_salary(&create_row(5, 0), 2026, 6, date(2026, 4, 11)).unwrap();

        assert_eq!(breakdown.base_salary, dec("0"));
        assert_eq!(breakdown.dearness_allowance, dec("0"));
        assert_eq!(breakdown.total_salary, dec("415"));
    }

    #[test]
    fn test_row_without_rates_yields_zero_travel_allowance() {
        let mut row = create_row(20, 0);
        row.price_per_km_car = Decimal::ZERO;
        row.price_per_km_bike = Decimal::ZERO;

        let breakdown = calculate_total_salary(&row, 2026, 4, date(2026, 5, 2)).unwrap();

        assert_eq!(breakdown.travel_allowance, dec("0"));
    }

    #[test]
    fn test_invalid_month_returns_validation_error() {
        let result = calculate_total_salary(&create_row(1, 0), 2026, 13, date(2026, 5, 2));

        match result {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "month"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_audit_steps_in_order() {
        let breakdown =
            calculate_total_salary(&create_row(20, 2), 2026, 4, date(2026, 5, 2)).unwrap();
        let rule_ids: Vec<&str> = breakdown
            .audit_trace
            .steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();

        assert_eq!(
            rule_ids,
            vec![
                "days_worked",
                "base_salary",
                "travel_allowance",
                "dearness_allowance",
                "total_salary"
            ]
        );
        assert_eq!(breakdown.audit_trace.steps[4].step_number, 5);
        assert_eq!(breakdown.audit_trace.steps[1].output["base_salary"], "21000");
    }

    #[test]
    fn test_repeated_calculation_is_identical() {
        let row = create_row(17, 3);
        let first = calculate_total_salary(&row, 2026, 3, date(2026, 4, 2)).unwrap();
        let second = calculate_total_salary(&row, 2026, 3, date(2026, 4, 2)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_overflowing_total_is_calculation_error() {
        let mut row = create_row(20, 2);
        row.approved_expense = Decimal::MAX;

        let result = calculate_total_salary(&row, 2026, 4, date(2026, 5, 2));

        match result {
            Err(EngineError::CalculationError { message }) => {
                assert!(message.contains("total salary"));
            }
            other => panic!("Expected CalculationError, got {:?}", other),
        }
    }
}
