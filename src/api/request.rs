//! Request types for the payroll engine API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{DateRange, PayMonth, TravelDetail};
use crate::report::{RecordSnapshot, ReportQuery};

/// Request body for `POST /salary/report`.
///
/// The caller supplies the records; nothing is fetched from the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryReportRequest {
    /// Calendar year of the pay month.
    pub year: i32,
    /// Month number, 1 to 12.
    pub month: u32,
    /// Only include employees reporting to this field officer.
    #[serde(default)]
    pub field_officer_id: Option<String>,
    /// The day the report is computed on. Defaults to the server's date.
    #[serde(default)]
    pub today: Option<NaiveDate>,
    /// The records to compute from.
    #[serde(default)]
    pub snapshot: RecordSnapshot,
}

impl SalaryReportRequest {
    /// The report query this request describes.
    pub fn report_query(&self) -> EngineResult<ReportQuery> {
        Ok(ReportQuery {
            pay_month: PayMonth::new(self.year, self.month)?,
            field_officer_id: self.field_officer_id.clone(),
        })
    }
}

/// Query string for `GET /salary/report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryReportParams {
    /// Calendar year of the pay month.
    pub year: i32,
    /// Month number, 1 to 12.
    pub month: u32,
    /// Only include employees reporting to this field officer.
    #[serde(default)]
    pub field_officer_id: Option<String>,
    /// The day the report is computed on. Defaults to the server's date.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

impl SalaryReportParams {
    /// The report query these parameters describe.
    pub fn report_query(&self) -> EngineResult<ReportQuery> {
        Ok(ReportQuery {
            pay_month: PayMonth::new(self.year, self.month)?,
            field_officer_id: self.field_officer_id.clone(),
        })
    }
}

/// Request body for `POST /travel/anomalies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyRequest {
    /// The travel details to scan.
    pub travel_details: Vec<TravelDetail>,
}

/// Request body for `POST /employees/:employee_id/backfill`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackfillRequest {
    /// First day to backfill (inclusive).
    pub start_date: NaiveDate,
    /// Last day to backfill (inclusive).
    pub end_date: NaiveDate,
}

impl BackfillRequest {
    /// The validated date range.
    pub fn date_range(&self) -> EngineResult<DateRange> {
        DateRange::new(self.start_date, self.end_date)
    }
}
