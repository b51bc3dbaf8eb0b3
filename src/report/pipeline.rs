//! Report pipeline.
//!
//! Builds salary rows from a snapshot of backend records and hands them to the
//! assembler. The snapshot is the only input; nothing is fetched here.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculation::{
    AttendanceSummary, PayProfile, aggregate_attendance, checked_sum, normalize_employee,
};
use crate::error::EngineResult;
use crate::models::{
    AttendanceRecord, Employee, ExpenseClaim, PayMonth, SalaryReport, SalaryRow, TravelDetail,
};

use super::assembler::{ReportInput, assemble_salary_report};

/// Records fetched from the backend for one report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSnapshot {
    /// Every employee.
    #[serde(default)]
    pub employees: Vec<Employee>,
    /// Attendance records for the month.
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
    /// Travel details for the month.
    #[serde(default)]
    pub travel_details: Vec<TravelDetail>,
    /// Expense claims for the month.
    #[serde(default)]
    pub expenses: Vec<ExpenseClaim>,
}

/// What a report covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    /// The month to report on.
    pub pay_month: PayMonth,
    /// Only include employees reporting to this field officer.
    pub field_officer_id: Option<String>,
}

/// Builds one employee's salary row.
///
/// Distances are the per-vehicle sums of the travel details inside the month;
/// the approved expense is the sum of approved claims inside the month.
///
/// # Returns
///
/// The row, or a `CalculationError` if a sum overflows.
pub fn build_salary_row(
    profile: &PayProfile,
    attendance: &AttendanceSummary,
    travel_details: &[TravelDetail],
    expenses: &[ExpenseClaim],
    pay_month: PayMonth,
) -> EngineResult<SalaryRow> {
    let in_month = || {
        travel_details
            .iter()
            .filter(move |d| pay_month.contains_date(d.date))
    };
    let car = checked_sum(in_month().map(|d| d.distance_travelled_by_car), "car distance")?;
    let bike = checked_sum(in_month().map(|d| d.distance_travelled_by_bike), "bike distance")?;

    let approved_expense = checked_sum(
        expenses
            .iter()
            .filter(|e| e.is_approved() && pay_month.contains_date(e.date))
            .map(|e| e.amount),
        "approved expense",
    )?;

    Ok(SalaryRow {
        employee_id: profile.employee_id.clone(),
        employee_name: profile.employee_name.clone(),
        full_month_salary: profile.full_month_salary,
        dearness_allowance: profile.dearness_allowance,
        full_days: attendance.full_days,
        half_days: attendance.half_days,
        distance_travelled_by_car: car,
        distance_travelled_by_bike: bike,
        price_per_km_car: profile.car_rate_per_km,
        price_per_km_bike: profile.bike_rate_per_km,
        approved_expense,
    })
}

/// Builds the salary report for a query from a record snapshot.
///
/// # Returns
///
/// The assembled report, a `Validation` error if the pay month is invalid, or
/// a `CalculationError` if an amount in the snapshot overflows.
pub fn build_salary_report(
    snapshot: &RecordSnapshot,
    query: &ReportQuery,
    today: NaiveDate,
) -> EngineResult<SalaryReport> {
    let pay_month = query.pay_month;
    let range = pay_month.date_range();

    let attendance_by_employee = group_by_employee(&snapshot.attendance, |r| &r.employee_id);
    let travel_by_employee = group_by_employee(&snapshot.travel_details, |d| &d.employee_id);
    let expenses_by_employee = group_by_employee(&snapshot.expenses, |e| &e.employee_id);

    let inputs = snapshot
        .employees
        .iter()
        .filter(|employee| match &query.field_officer_id {
            Some(officer) => employee.reports_to(officer),
            None => true,
        })
        .map(|employee| {
            let normalized = normalize_employee(employee);
            let attendance = attendance_by_employee
                .get(employee.id.as_str())
                .cloned()
                .unwrap_or_default();
            let travel: Vec<TravelDetail> = travel_by_employee
                .get(employee.id.as_str())
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .filter(|d| pay_month.contains_date(d.date))
                .collect();
            let expenses = expenses_by_employee
                .get(employee.id.as_str())
                .cloned()
                .unwrap_or_default();

            let summary =
                aggregate_attendance(&attendance, range.start_date, range.end_date, today);
            let row =
                build_salary_row(&normalized.profile, &summary, &travel, &expenses, pay_month)?;

            debug!(
                employee_id = %employee.id,
                full_days = row.full_days,
                half_days = row.half_days,
                travel_days = travel.len(),
                "Built salary row"
            );

            Ok(ReportInput {
                row,
                travel_details: travel,
                warnings: normalized.warnings,
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    assemble_salary_report(inputs, pay_month, query.field_officer_id.clone(), today)
}

fn group_by_employee<'a, T: Clone>(
    items: &'a [T],
    key: impl Fn(&'a T) -> &'a String,
) -> HashMap<&'a str, Vec<T>> {
    let mut grouped: HashMap<&'a str, Vec<T>> = HashMap::new();
    for item in items {
        grouped
            .entry(key(item).as_str())
            .or_default()
            .push(item.clone());
    }
    grouped
}
