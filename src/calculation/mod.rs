//! Calculation logic for the payroll engine.
//!
//! This module contains the pure functions behind a salary report: input
//! normalisation, attendance aggregation, base salary proration, travel and
//! dearness allowances, the total salary breakdown, and travel anomaly
//! detection. None of them perform I/O.

mod anomaly_detection;
mod attendance_aggregation;
mod base_salary;
mod checked;
mod dearness_allowance;
mod normalization;
mod rounding;
mod total_salary;
mod travel_allowance;

pub use anomaly_detection::{AnomalyReport, detect_anomalies};
pub use attendance_aggregation::{
    AttendanceSummary, DayAttendance, DaySource, aggregate_attendance,
};
pub use base_salary::{calculate_base_salary, total_days_worked};
pub(crate) use checked::{checked_product, checked_sum};
pub use dearness_allowance::calculate_dearness_allowance;
pub use normalization::{
    NEGATIVE_RATE_CLAMPED, NormalizedEmployee, PayProfile, normalize_employee,
};
pub use rounding::round_currency;
pub use total_salary::{DAYS_WORKED_CLAMPED, calculate_total_salary};
pub use travel_allowance::calculate_travel_allowance;
