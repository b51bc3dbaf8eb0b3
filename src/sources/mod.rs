//! Record sources and sinks.
//!
//! The engine reads employees, attendance, travel details and expense claims
//! from the backend, and writes recomputed travel distances back. Each concern
//! is a trait so calculations and the backfiller can run against fakes;
//! [`BackendClient`] implements all of them over HTTP.

mod backend;
mod retry;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::EngineResult;
use crate::models::{
    AttendanceRecord, DateRange, Employee, ExpenseClaim, TravelAllowanceEntry, TravelDetail,
};
use crate::report::RecordSnapshot;

pub use backend::BackendClient;
pub use retry::RetryPolicy;

/// Lists employees.
#[async_trait]
pub trait EmployeeSource: Send + Sync {
    /// Every employee known to the backend.
    async fn employees(&self) -> EngineResult<Vec<Employee>>;
}

/// Reads attendance records.
#[async_trait]
pub trait AttendanceSource: Send + Sync {
    /// Attendance records of all employees whose check-in falls in `range`.
    async fn attendance(&self, range: DateRange) -> EngineResult<Vec<AttendanceRecord>>;
}

/// Reads travel details.
#[async_trait]
pub trait TravelSource: Send + Sync {
    /// Travel details in `range`, for one employee or for everyone.
    async fn travel_details(
        &self,
        employee_id: Option<&str>,
        range: DateRange,
    ) -> EngineResult<Vec<TravelDetail>>;
}

/// Reads expense claims.
#[async_trait]
pub trait ExpenseSource: Send + Sync {
    /// Expense claims of all employees dated in `range`.
    async fn expenses(&self, range: DateRange) -> EngineResult<Vec<ExpenseClaim>>;
}

/// Writes recomputed travel distances.
#[async_trait]
pub trait TravelAllowanceSink: Send + Sync {
    /// Creates the travel-allowance entry for one employee and day.
    async fn create_travel_allowance(&self, entry: &TravelAllowanceEntry) -> EngineResult<()>;
}

/// The sources a salary report is built from.
#[derive(Clone)]
pub struct RecordSources {
    /// Employee listing.
    pub employees: Arc<dyn EmployeeSource>,
    /// Attendance log.
    pub attendance: Arc<dyn AttendanceSource>,
    /// Travel details.
    pub travel: Arc<dyn TravelSource>,
    /// Expense claims.
    pub expenses: Arc<dyn ExpenseSource>,
}

impl RecordSources {
    /// Uses one backend client for every source.
    pub fn from_backend(client: Arc<BackendClient>) -> Self {
        Self {
            employees: client.clone(),
            attendance: client.clone(),
            travel: client.clone(),
            expenses: client,
        }
    }

    /// Fetches everything a report over `range` needs, concurrently.
    ///
    /// The first failing fetch fails the whole snapshot.
    pub async fn fetch_snapshot(&self, range: DateRange) -> EngineResult<RecordSnapshot> {
        let (employees, attendance, travel_details, expenses) = tokio::try_join!(
            self.employees.employees(),
            self.attendance.attendance(range),
            self.travel.travel_details(None, range),
            self.expenses.expenses(range),
        )?;

        debug!(
            employees = employees.len(),
            attendance = attendance.len(),
            travel_details = travel_details.len(),
            expenses = expenses.len(),
            "Fetched record snapshot"
        );

        Ok(RecordSnapshot {
            employees,
            attendance,
            travel_details,
            expenses,
        })
    }
}
