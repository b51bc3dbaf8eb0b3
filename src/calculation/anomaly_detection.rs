//! Travel anomaly detection.
//!
//! A day is anomalous when a checkout was recorded but no distance was, which
//! means the distance data is missing and can be backfilled.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::TravelDetail;

/// Days with a checkout but no recorded distance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// Number of anomalous days.
    pub count: usize,
    /// The anomalous days, in the order the details were given.
    pub dates: Vec<NaiveDate>,
}

impl AnomalyReport {
    /// Returns true if there is nothing to backfill.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Scans travel details for anomalous days.
///
/// The rule is strictly "checkout happened and distance is zero". A zero
/// distance day without any checkout is normal.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::detect_anomalies;
/// use payroll_engine::models::TravelDetail;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let detail = |day: u32, checkouts: u32, km: i64| TravelDetail {
///     employee_id: "emp_001".to_string(),
///     date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
///     checkout_count: checkouts,
///     total_distance_travelled: Decimal::new(km, 0),
///     distance_travelled_by_car: Decimal::ZERO,
///     distance_travelled_by_bike: Decimal::ZERO,
///     visit_details: vec![],
/// };
///
/// let report = detect_anomalies(&[detail(2, 1, 0), detail(3, 0, 0), detail(4, 2, 12)]);
/// assert_eq!(report.count, 1);
/// assert_eq!(report.dates, vec![NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()]);
/// ```
pub fn detect_anomalies(details: &[TravelDetail]) -> AnomalyReport {
    let dates: Vec<NaiveDate> = details
        .iter()
        .filter(|d| d.is_anomalous())
        .map(|d| d.date)
        .collect();

    AnomalyReport {
        count: dates.len(),
        dates,
    }
}
