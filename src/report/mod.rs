//! Salary report building.
//!
//! [`build_salary_report`] turns a snapshot of backend records into a
//! [`SalaryReport`](crate::models::SalaryReport); [`assemble_salary_report`] is
//! the final fold over prepared rows.

mod assembler;
mod pipeline;

pub use assembler::{ReportInput, assemble_salary_report};
pub use pipeline::{RecordSnapshot, ReportQuery, build_salary_report, build_salary_row};
