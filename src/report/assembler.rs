//! Salary report assembly.
//!
//! Folds already-built salary rows into the sorted, annotated report the
//! rendering layer consumes.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::calculation::{calculate_total_salary, checked_sum, detect_anomalies};
use crate::error::EngineResult;
use crate::models::{
    AuditWarning, PayMonth, ReportTotals, SalaryBreakdown, SalaryReport, SalaryReportLine,
    SalaryRow, TravelDetail,
};

/// One employee's input to the assembler.
#[derive(Debug, Clone)]
pub struct ReportInput {
    /// The employee's salary row for the month.
    pub row: SalaryRow,
    /// The employee's travel details for the month, used for anomaly counts.
    pub travel_details: Vec<TravelDetail>,
    /// Warnings raised while building the row.
    pub warnings: Vec<AuditWarning>,
}

/// Assembles a salary report from per-employee inputs.
///
/// Each line gets its salary breakdown and anomaly count. Lines are ordered by
/// employee name ignoring case, then by employee id so equal names keep a
/// stable order.
///
/// # Returns
///
/// The report, a `Validation` error if the pay month is invalid, or a
/// `CalculationError` if a line or the grand totals overflow.
pub fn assemble_salary_report(
    inputs: Vec<ReportInput>,
    pay_month: PayMonth,
    field_officer_id: Option<String>,
    today: NaiveDate,
) -> EngineResult<SalaryReport> {
    let mut lines = Vec::with_capacity(inputs.len());

    for input in inputs {
        let mut breakdown =
            calculate_total_salary(&input.row, pay_month.year, pay_month.month, today)?;
        // Row-building warnings come first so they read in pipeline order.
        let mut warnings = input.warnings;
        warnings.append(&mut breakdown.audit_trace.warnings);
        breakdown.audit_trace.warnings = warnings;

        let anomaly_count = detect_anomalies(&input.travel_details).count;

        lines.push(SalaryReportLine {
            row: input.row,
            breakdown,
            anomaly_count,
        });
    }

    lines.sort_by(|a, b| {
        a.row
            .employee_name
            .to_lowercase()
            .cmp(&b.row.employee_name.to_lowercase())
            .then_with(|| a.row.employee_id.cmp(&b.row.employee_id))
    });

    let totals = report_totals(&lines)?;

    Ok(SalaryReport {
        report_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        pay_month,
        field_officer_id,
        lines,
        totals,
    })
}

fn report_totals(lines: &[SalaryReportLine]) -> EngineResult<ReportTotals> {
    let total = |what: &str, amount: fn(&SalaryBreakdown) -> Decimal| {
        checked_sum(lines.iter().map(|line| amount(&line.breakdown)), what)
    };

    Ok(ReportTotals {
        base_salary: total("total base salary", |b| b.base_salary)?,
        travel_allowance: total("total travel allowance", |b| b.travel_allowance)?,
        dearness_allowance: total("total dearness allowance", |b| b.dearness_allowance)?,
        approved_expense: total("total approved expense", |b| b.approved_expense)?,
        total_salary: total("total salary payable", |b| b.total_salary)?,
        anomaly_days: lines.iter().map(|line| line.anomaly_count).sum(),
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

    fn row(id: &str, name: &str, full_days: u32) -> SalaryRow {
        SalaryRow {
            employee_id: id.to_string(),
            employee_name: name.to_string(),
            full_month_salary: dec("30000"),
            dearness_allowance: dec("100"),
            full_days,
            half_days: 0,
            distance_travelled_by_car: dec("0"),
            distance_travelled_by_bike: dec("10"),
            price_per_km_car: dec("8"),
            price_per_km_bike: dec("4"),
            approved_expense: dec("0"),
        }
    }

    fn anomalous_day(id: &str, day: u32) -> TravelDetail {
        TravelDetail {
            employee_id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 4, day).unwrap(),
            checkout_count: 1,
            total_distance_travelled: Decimal::ZERO,
            distance_travelled_by_car: Decimal::ZERO,
            distance_travelled_by_bike: Decimal::ZERO,
            visit_details: vec![],
        }
    }

    fn input(row: SalaryRow, travel_details: Vec<TravelDetail>) -> ReportInput {
        ReportInput {
            row,
            travel_details,
            warnings: vec![],
        }
    }

    fn april() -> PayMonth {
        PayMonth::new(2026, 4).unwrap()
    }

    fn after_april() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 3).unwrap()
    }

    #[test]
    fn test_lines_sorted_by_name_ignoring_case() {
        let report = assemble_salary_report(
            vec![
                input(row("e1", "ravi", 10), vec![]),
                input(row("e2", "Asha", 10), vec![]),
                input(row("e3", "meena", 10), vec![]),
                input(row("e4", "Bala", 10), vec![]),
            ],
            april(),
            None,
            after_april(),
        )
        .unwrap();

        let names: Vec<&str> = report
            .lines
            .iter()
            .map(|l| l.row.employee_name.as_str())
            .collect();
        assert_eq!(names, vec!["Asha", "Bala", "meena", "ravi"]);
    }

    #[test]
    fn test_equal_names_ordered_by_id() {
        let report = assemble_salary_report(
            vec![
                input(row("e9", "Kiran", 10), vec![]),
                input(row("e2", "kiran", 10), vec![]),
            ],
            april(),
            None,
            after_april(),
        )
        .unwrap();

        assert_eq!(report.lines[0].row.employee_id, "e2");
        assert_eq!(report.lines[1].row.employee_id, "e9");
    }

    #[test]
    fn test_lines_annotated_with_breakdown_and_anomalies() {
        let report = assemble_salary_report(
            vec![input(
                row("e1", "Asha", 15),
                vec![anomalous_day("e1", 6), anomalous_day("e1", 7)],
            )],
            april(),
            Some("fo_1".to_string()),
            after_april(),
        )
        .unwrap();

        let line = &report.lines[0];
        assert_eq!(line.anomaly_count, 2);
        assert_eq!(line.breakdown.base_salary, dec("15000"));
        assert_eq!(line.breakdown.travel_allowance, dec("40"));
        assert_eq!(line.breakdown.dearness_allowance, dec("1500"));
        assert_eq!(line.breakdown.total_salary, dec("16540"));
        assert_eq!(report.field_officer_id.as_deref(), Some("fo_1"));
    }

    #[test]
    fn test_totals_sum_every_line() {
        let report = assemble_salary_report(
            vec![
                input(row("e1", "Asha", 15), vec![anomalous_day("e1", 6)]),
                input(row("e2", "Bala", 30), vec![]),
            ],
            april(),
            None,
            after_april(),
        )
        .unwrap();

        assert_eq!(report.totals.base_salary, dec("45000"));
        assert_eq!(report.totals.travel_allowance, dec("80"));
        assert_eq!(report.totals.dearness_allowance, dec("4500"));
        assert_eq!(report.totals.total_salary, dec("49580"));
        assert_eq!(report.totals.anomaly_days, 1);
    }

    #[test]
    fn test_totals_overflow_is_calculation_error() {
        let mut first = row("e1", "Asha", 15);
        first.approved_expense = dec("50000000000000000000000000000");
        let mut second = row("e2", "Bala", 15);
        second.approved_expense = dec("50000000000000000000000000000");

        let result = assemble_salary_report(
            vec![input(first, vec![]), input(second, vec![])],
            april(),
            None,
            after_april(),
        );

        match result {
            Err(EngineError::CalculationError { message }) => {
                assert!(message.starts_with("total"));
            }
            other => panic!("Expected CalculationError, got {:?}", other),
        }
    }

    #[test]
    fn test_row_warnings_precede_calculation_warnings() {
        let mut first = input(row("e1", "Asha", 45), vec![]);
        first.warnings.push(AuditWarning {
            code: "NEGATIVE_RATE_CLAMPED".to_string(),
            message: "negative".to_string(),
            severity: "medium".to_string(),
        });

        let report = assemble_salary_report(vec![first], april(), None, after_april()).unwrap();

        let codes: Vec<&str> = report.lines[0]
            .breakdown
            .audit_trace
            .warnings
            .iter()
            .map(|w| w.code.as_str())
            .collect();
        assert_eq!(codes, vec!["NEGATIVE_RATE_CLAMPED", "DAYS_WORKED_CLAMPED"]);
    }

    #[test]
    fn test_empty_input_gives_empty_report() {
        let report = assemble_salary_report(vec![], april(), None, after_april()).unwrap();

        assert!(report.lines.is_empty());
        assert_eq!(report.totals, ReportTotals::default());
    }
}
