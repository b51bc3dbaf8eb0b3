//! Employee model.
//!
//! Employees are owned by the backend. The engine only reads the pay fields,
//! any of which may be absent on incomplete records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An employee as returned by the backend employee listing.
///
/// Pay fields are optional because the backend allows incomplete records.
/// They are turned into a fully populated pay profile by
/// [`normalize_employee`](crate::calculation::normalize_employee) before any
/// arithmetic runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name, used to order reports.
    pub name: String,
    /// Salary for a complete month.
    pub full_month_salary: Option<Decimal>,
    /// Dearness allowance paid per worked day.
    pub dearness_allowance: Option<Decimal>,
    /// Travel allowance rate per kilometre driven by car.
    pub car_rate_per_km: Option<Decimal>,
    /// Travel allowance rate per kilometre ridden by bike.
    pub bike_rate_per_km: Option<Decimal>,
    /// The field officer this employee reports to, if any.
    #[serde(default)]
    pub field_officer_id: Option<String>,
}

impl Employee {
    /// Returns true if the employee reports to the given field officer.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     name: "Asha Rao".to_string(),
    ///     full_month_salary: None,
    ///     dearness_allowance: None,
    ///     car_rate_per_km: None,
    ///     bike_rate_per_km: None,
    ///     field_officer_id: Some("fo_12".to_string()),
    /// };
    /// assert!(employee.reports_to("fo_12"));
    /// assert!(!employee.reports_to("fo_99"));
    /// ```
    pub fn reports_to(&self, field_officer_id: &str) -> bool {
        self.field_officer_id.as_deref() == Some(field_officer_id)
    }
}
