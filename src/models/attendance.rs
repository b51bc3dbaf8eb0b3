//! Attendance records.

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The attendance classification recorded at check-in.
///
/// Labels are matched exactly as the backend writes them: `"full day"`,
/// `"half day"` and `"Absent"`. Anything else deserializes to
/// [`AttendanceStatus::Unrecognized`] and is ignored by aggregation.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AttendanceStatus;
///
/// let status: AttendanceStatus = serde_json::from_str("\"half day\"").unwrap();
/// assert_eq!(status, AttendanceStatus::HalfDay);
///
/// let status: AttendanceStatus = serde_json::from_str("\"Full Day\"").unwrap();
/// assert_eq!(status, AttendanceStatus::Unrecognized);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    /// A full working day.
    #[serde(rename = "full day")]
    FullDay,
    /// Half a working day.
    #[serde(rename = "half day")]
    HalfDay,
    /// Marked absent.
    #[serde(rename = "Absent")]
    Absent,
    /// Any label the engine does not know.
    #[serde(other)]
    Unrecognized,
}

impl AttendanceStatus {
    /// The day-equivalent this status contributes to pay proration.
    pub fn worked_fraction(self) -> Decimal {
        match self {
            AttendanceStatus::FullDay => Decimal::ONE,
            AttendanceStatus::HalfDay => Decimal::new(5, 1),
            AttendanceStatus::Absent | AttendanceStatus::Unrecognized => Decimal::ZERO,
        }
    }

    /// Returns true for the three labels the engine counts.
    pub fn is_recognized(self) -> bool {
        self != AttendanceStatus::Unrecognized
    }
}

/// One check-in event for an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// The employee who checked in.
    pub employee_id: String,
    /// The recorded classification for the day.
    pub attendance_status: AttendanceStatus,
    /// When the employee checked in, in the offset it was recorded with.
    pub checkin_date: DateTime<FixedOffset>,
    /// When the employee checked out, if they did.
    #[serde(default)]
    pub checkout_date: Option<DateTime<FixedOffset>>,
}

impl AttendanceRecord {
    /// The calendar day this record counts towards.
    ///
    /// The day is taken in the offset the check-in was recorded with, so a
    /// check-in at 00:30 local time belongs to that local day.
    pub fn calendar_date(&self) -> NaiveDate {
        self.checkin_date.date_naive()
    }
}
