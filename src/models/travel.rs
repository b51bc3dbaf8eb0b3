//! Travel details, visit check-ins and travel-allowance entries.
//!
//! Distances are kilometres. Missing or `null` distance fields are read as
//! zero at deserialization time.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// The vehicle used to reach a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VehicleType {
    /// Car travel, paid at the car rate.
    Car,
    /// Bike travel, paid at the bike rate. Visits with no vehicle are bike.
    #[default]
    Bike,
}

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A single customer visit recorded during the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitDetail {
    /// Latitude captured at check-in.
    #[serde(default)]
    pub checkin_latitude: Option<f64>,
    /// Longitude captured at check-in.
    #[serde(default)]
    pub checkin_longitude: Option<f64>,
    /// Vehicle used to reach this visit.
    #[serde(default)]
    pub vehicle_type: Option<VehicleType>,
}

impl VisitDetail {
    /// The check-in point, when both coordinates were captured.
    pub fn checkin_coordinates(&self) -> Option<Coordinates> {
        match (self.checkin_latitude, self.checkin_longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    /// The vehicle for this visit, defaulting to bike.
    pub fn vehicle(&self) -> VehicleType {
        self.vehicle_type.unwrap_or_default()
    }
}

/// Travel summary for one employee on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelDetail {
    /// The employee who travelled.
    pub employee_id: String,
    /// The day travelled.
    pub date: NaiveDate,
    /// Number of visit checkouts recorded that day.
    #[serde(default)]
    pub checkout_count: u32,
    /// Total distance travelled that day.
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_distance_travelled: Decimal,
    /// Portion of the distance travelled by car.
    #[serde(default, deserialize_with = "zero_if_null")]
    pub distance_travelled_by_car: Decimal,
    /// Portion of the distance travelled by bike.
    #[serde(default, deserialize_with = "zero_if_null")]
    pub distance_travelled_by_bike: Decimal,
    /// Visits in the order they were recorded.
    #[serde(default)]
    pub visit_details: Vec<VisitDetail>,
}

impl TravelDetail {
    /// Returns true if a checkout happened but no distance was recorded.
    ///
    /// A day without any checkout is never anomalous, even at zero distance.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::TravelDetail;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let mut detail = TravelDetail {
    ///     employee_id: "emp_001".to_string(),
    ///     date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
    ///     checkout_count: 1,
    ///     total_distance_travelled: Decimal::ZERO,
    ///     distance_travelled_by_car: Decimal::ZERO,
    ///     distance_travelled_by_bike: Decimal::ZERO,
    ///     visit_details: vec![],
    /// };
    /// assert!(detail.is_anomalous());
    ///
    /// detail.checkout_count = 0;
    /// assert!(!detail.is_anomalous());
    /// ```
    pub fn is_anomalous(&self) -> bool {
        self.checkout_count > 0 && self.total_distance_travelled.is_zero()
    }
}

/// The write sent to the backend when a day's distances are recomputed.
///
/// Distances go out as JSON numbers, the form the backend stores them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelAllowanceEntry {
    /// The employee the distances belong to.
    pub employee_id: String,
    /// The day the distances belong to.
    pub date: NaiveDate,
    /// Recomputed car distance in kilometres.
    #[serde(with = "rust_decimal::serde::float")]
    pub distance_travelled_by_car: Decimal,
    /// Recomputed bike distance in kilometres.
    #[serde(with = "rust_decimal::serde::float")]
    pub distance_travelled_by_bike: Decimal,
}

impl TravelAllowanceEntry {
    /// Combined distance for the day.
    pub fn total_distance(&self) -> Decimal {
        self.distance_travelled_by_car.saturating_add(self.distance_travelled_by_bike)
    }
}

/// Reads an optional number and treats `null` as zero.
pub(crate) fn zero_if_null<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Decimal>::deserialize(deserializer)?.unwrap_or(Decimal::ZERO))
}
