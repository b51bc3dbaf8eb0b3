//! Expense claims reimbursed through payroll.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::travel::zero_if_null;

/// Review state of an expense claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpenseStatus {
    /// Approved for reimbursement.
    Approved,
    /// Awaiting review.
    Pending,
    /// Rejected by the reviewer.
    Rejected,
    /// Any state the engine does not know; never reimbursed.
    #[serde(other)]
    Unknown,
}

/// A single expense claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseClaim {
    /// The employee who filed the claim.
    pub employee_id: String,
    /// The day the expense was incurred.
    pub date: NaiveDate,
    /// Claimed amount.
    #[serde(default, deserialize_with = "zero_if_null")]
    pub amount: Decimal,
    /// Review state.
    pub status: ExpenseStatus,
}

impl ExpenseClaim {
    /// Returns true if the claim is approved.
    pub fn is_approved(&self) -> bool {
        self.status == ExpenseStatus::Approved
    }
}
