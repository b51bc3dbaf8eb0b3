//! Core data models for the payroll engine.
//!
//! Records read from the backend (employees, attendance, travel, expenses)
//! and the salary rows and reports derived from them.

mod attendance;
mod employee;
mod expense;
mod pay_month;
mod salary;
mod travel;

pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use employee::Employee;
pub use expense::{ExpenseClaim, ExpenseStatus};
pub use pay_month::{DateRange, PayMonth};
pub use salary::{
    AuditStep, AuditTrace, AuditWarning, ReportTotals, SalaryBreakdown, SalaryReport,
    SalaryReportLine, SalaryRow,
};
pub use travel::{Coordinates, TravelAllowanceEntry, TravelDetail, VehicleType, VisitDetail};
