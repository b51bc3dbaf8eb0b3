//! Salary models for the payroll engine.
//!
//! This module contains the derived [`SalaryRow`] input, the per-employee
//! [`SalaryBreakdown`] output, and the [`SalaryReport`] that the rendering
//! layer consumes, together with the audit types that explain each figure.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PayMonth;

/// Everything needed to compute one employee's salary for a month.
///
/// Built fresh for every report from the employee, their attendance and their
/// travel records. All numeric fields are already normalised, so arithmetic
/// never has to deal with missing values.
///
/// # Example
///
/// ```
/// use payroll_engine::models::SalaryRow;
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
///     approved_expense: Decimal::ZERO,
/// };
/// assert_eq!(row.raw_days_worked(), Decimal::new(21, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRow {
    /// The employee this row is for.
    pub employee_id: String,
    /// The employee's display name.
    pub employee_name: String,
    /// Salary for a complete month.
    pub full_month_salary: Decimal,
    /// Dearness allowance per worked day.
    pub dearness_allowance: Decimal,
    /// Days counted as full days.
    pub full_days: u32,
    /// Days counted as half days.
    pub half_days: u32,
    /// Kilometres travelled by car in the month.
    pub distance_travelled_by_car: Decimal,
    /// Kilometres travelled by bike in the month.
    pub distance_travelled_by_bike: Decimal,
    /// Travel allowance per car kilometre.
    pub price_per_km_car: Decimal,
    /// Travel allowance per bike kilometre.
    pub price_per_km_bike: Decimal,
    /// Approved expense reimbursements for the month.
    pub approved_expense: Decimal,
}

impl SalaryRow {
    /// Full days plus half of the half days, before any clamping.
    pub fn raw_days_worked(&self) -> Decimal {
        Decimal::from(self.full_days) + Decimal::from(self.half_days) * Decimal::new(5, 1)
    }
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag input that was corrected rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The audit trace for one salary computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// The computed salary components for one employee and month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryBreakdown {
    /// Days in the pay month.
    pub days_in_month: u32,
    /// Last day of the month that may count towards pay.
    pub last_countable_day: u32,
    /// Full days plus half of the half days, clamped to the last countable day.
    pub total_days_worked: Decimal,
    /// Prorated base salary.
    pub base_salary: Decimal,
    /// Car and bike travel allowance.
    pub travel_allowance: Decimal,
    /// Prorated dearness allowance.
    pub dearness_allowance: Decimal,
    /// Approved expense reimbursements.
    pub approved_expense: Decimal,
    /// Sum of every component, in whole currency units.
    pub total_salary: Decimal,
    /// How each figure was reached.
    pub audit_trace: AuditTrace,
}

/// One employee's line in a salary report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryReportLine {
    /// The row the figures were computed from.
    pub row: SalaryRow,
    /// The computed figures.
    pub breakdown: SalaryBreakdown,
    /// Days with a checkout but no recorded distance.
    pub anomaly_count: usize,
}

/// Sums across every line of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    /// Total base salary.
    pub base_salary: Decimal,
    /// Total travel allowance.
    pub travel_allowance: Decimal,
    /// Total dearness allowance.
    pub dearness_allowance: Decimal,
    /// Total approved expenses.
    pub approved_expense: Decimal,
    /// Total salary payable.
    pub total_salary: Decimal,
    /// Total anomalous travel days across employees.
    pub anomaly_days: usize,
}

/// The salary report handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryReport {
    /// Unique identifier for this report.
    pub report_id: Uuid,
    /// When the report was assembled.
    pub generated_at: DateTime<Utc>,
    /// The version of the engine that produced the report.
    pub engine_version: String,
    /// The month reported on.
    pub pay_month: PayMonth,
    /// The field officer filter, if one was applied.
    pub field_officer_id: Option<String>,
    /// One line per employee, ordered by name.
    pub lines: Vec<SalaryReportLine>,
    /// Sums across all lines.
    pub totals: ReportTotals,
}
