//! Attendance aggregation.
//!
//! Turns an employee's check-in records into full, half and absent day counts
//! for a date range, together with the per-day breakdown behind the counts.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{AttendanceRecord, AttendanceStatus};

/// Where a day's effective status came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySource {
    /// A check-in record for the day.
    Recorded,
    /// No record; Sundays count as a full day.
    SundayDefault,
}

/// The effective attendance for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAttendance {
    /// The calendar day.
    pub date: NaiveDate,
    /// The status that counts for the day.
    pub status: AttendanceStatus,
    /// The day-equivalent worked (1, 0.5 or 0).
    pub worked_fraction: Decimal,
    /// Where the status came from.
    pub source: DaySource,
}

/// Day counts for one employee over a range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Days counted as full days.
    pub full_days: u32,
    /// Days counted as half days.
    pub half_days: u32,
    /// Days marked absent.
    pub absent_days: u32,
    /// The counted days, in date order.
    pub days: Vec<DayAttendance>,
}

impl AttendanceSummary {
    /// Total day-equivalents worked.
    pub fn days_worked(&self) -> Decimal {
        self.days.iter().map(|d| d.worked_fraction).sum()
    }
}

/// Aggregates attendance records for one employee over `[start, end]`.
///
/// Counting stops at the day before `today`, so a range reaching into the
/// current month only counts days up to yesterday and future days never count.
///
/// Rules per calendar day:
/// - The first record with a recognised status wins. Later records for the
///   same day are ignored.
/// - Records with an unrecognised status are ignored entirely.
/// - A day with no recognised record counts as a full day if it is a Sunday,
///   and is not counted otherwise.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::aggregate_attendance;
/// use payroll_engine::models::{AttendanceRecord, AttendanceStatus};
/// use chrono::{DateTime, NaiveDate};
///
/// let record = AttendanceRecord {
///     employee_id: "emp_001".to_string(),
///     attendance_status: AttendanceStatus::HalfDay,
///     checkin_date: DateTime::parse_from_rfc3339("2026-03-03T09:00:00+05:30").unwrap(),
///     checkout_date: None,
/// };
///
/// // 2026-03-01 is a Sunday.
/// let summary = aggregate_attendance(
///     &[record],
///     NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
/// );
/// assert_eq!(summary.full_days, 1);
/// assert_eq!(summary.half_days, 1);
/// ```
pub fn aggregate_attendance(
    records: &[AttendanceRecord],
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> AttendanceSummary {
    let mut summary = AttendanceSummary::default();

    let Some(yesterday) = today.pred_opt() else {
        return summary;
    };
    let window_end = end.min(yesterday);
    if window_end < start {
        return summary;
    }

    let mut by_date: HashMap<NaiveDate, AttendanceStatus> = HashMap::new();
    for record in records {
        let status = record.attendance_status;
        if !status.is_recognized() {
            continue;
        }
        let date = record.calendar_date();
        if date < start || date > window_end {
            continue;
        }
        if let Some(existing) = by_date.get(&date) {
            debug!(
                employee_id = %record.employee_id,
                date = %date,
                kept = ?existing,
                ignored = ?status,
                "Duplicate attendance record ignored"
            );
            continue;
        }
        by_date.insert(date, status);
    }

    for date in start.iter_days().take_while(|d| *d <= window_end) {
        let (status, source) = match by_date.get(&date) {
            Some(status) => (*status, DaySource::Recorded),
            None if date.weekday() == Weekday::Sun => {
                (AttendanceStatus::FullDay, DaySource::SundayDefault)
            }
            None => continue,
        };

        match status {
            AttendanceStatus::FullDay => summary.full_days += 1,
            AttendanceStatus::HalfDay => summary.half_days += 1,
            AttendanceStatus::Absent => summary.absent_days += 1,
            AttendanceStatus::Unrecognized => continue,
        }

        summary.days.push(DayAttendance {
            date,
            status,
            worked_fraction: status.worked_fraction(),
            source,
        });
    }

    summary
}
