//! Distance backfill runs.
//!
//! A run recomputes the distances of every anomalous day in a date range for
//! one employee. Days are processed one at a time, and so are the distance
//! calls within a day. A failure on one day is recorded and the run moves on;
//! nothing already written is undone.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::{DashMap, DashSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{checked_sum, detect_anomalies};
use crate::error::{EngineError, EngineResult};
use crate::models::{DateRange, TravelAllowanceEntry, TravelDetail, VehicleType};
use crate::sources::{TravelAllowanceSink, TravelSource};

use super::provider::DistanceProvider;

/// Where an employee's backfill stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackfillState {
    /// No run in progress.
    Idle,
    /// A run is recomputing distances.
    Calculating,
    /// The last run wrote or skipped every anomalous day without error.
    Success,
    /// The last run failed on at least one day.
    Failure,
}

/// What happened to one anomalous day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DateOutcome {
    /// Distances were recomputed and written.
    Written {
        /// The day.
        date: NaiveDate,
        /// Recomputed car distance in kilometres.
        distance_travelled_by_car: Decimal,
        /// Recomputed bike distance in kilometres.
        distance_travelled_by_bike: Decimal,
        /// Number of visit pairs routed.
        routed_pairs: usize,
    },
    /// Nothing was written: no consecutive visits had coordinates, or every
    /// routed leg was zero.
    Skipped {
        /// The day.
        date: NaiveDate,
        /// Why the day was skipped.
        reason: String,
    },
    /// A distance call or the write failed; the day stays anomalous.
    Failed {
        /// The day.
        date: NaiveDate,
        /// The error that stopped this day.
        error: String,
    },
}

impl DateOutcome {
    /// The day this outcome is for.
    pub fn date(&self) -> NaiveDate {
        match self {
            DateOutcome::Written { date, .. }
            | DateOutcome::Skipped { date, .. }
            | DateOutcome::Failed { date, .. } => *date,
        }
    }

    fn is_failed(&self) -> bool {
        matches!(self, DateOutcome::Failed { .. })
    }
}

/// The result of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackfillOutcome {
    /// Unique id of the run.
    pub run_id: Uuid,
    /// The employee whose days were backfilled.
    pub employee_id: String,
    /// The range the run covered.
    pub range: DateRange,
    /// `Success` or `Failure`.
    pub state: BackfillState,
    /// Anomalous days found before the run.
    pub anomalies_before: usize,
    /// Anomalous days left after the run, when the re-fetch succeeded.
    pub anomalies_after: Option<usize>,
    /// One entry per anomalous day, in date order.
    pub dates: Vec<DateOutcome>,
    /// Travel details re-fetched after the run.
    pub travel_details: Vec<TravelDetail>,
    /// Set when the re-fetch itself failed.
    pub refetch_error: Option<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

/// Runs distance backfills, at most one at a time per employee.
pub struct DistanceBackfiller {
    provider: Arc<dyn DistanceProvider>,
    travel: Arc<dyn TravelSource>,
    sink: Arc<dyn TravelAllowanceSink>,
    running: DashSet<String>,
    last_outcomes: DashMap<String, BackfillOutcome>,
}

/// Clears the in-progress mark when a run ends, however it ends.
struct RunGuard<'a> {
    running: &'a DashSet<String>,
    employee_id: String,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.remove(&self.employee_id);
    }
}

impl DistanceBackfiller {
    /// Creates a backfiller over the given provider, source and sink.
    pub fn new(
        provider: Arc<dyn DistanceProvider>,
        travel: Arc<dyn TravelSource>,
        sink: Arc<dyn TravelAllowanceSink>,
    ) -> Self {
        Self {
            provider,
            travel,
            sink,
            running: DashSet::new(),
            last_outcomes: DashMap::new(),
        }
    }

    /// `Calculating` while a run is in progress for the employee, else `Idle`.
    pub fn state(&self, employee_id: &str) -> BackfillState {
        if self.running.contains(employee_id) {
            BackfillState::Calculating
        } else {
            BackfillState::Idle
        }
    }

    /// The outcome of the employee's most recent finished run.
    pub fn last_outcome(&self, employee_id: &str) -> Option<BackfillOutcome> {
        self.last_outcomes
            .get(employee_id)
            .map(|entry| entry.value().clone())
    }

    fn try_start(&self, employee_id: &str) -> EngineResult<RunGuard<'_>> {
        if !self.running.insert(employee_id.to_string()) {
            return Err(EngineError::BackfillInProgress {
                employee_id: employee_id.to_string(),
            });
        }
        Ok(RunGuard {
            running: &self.running,
            employee_id: employee_id.to_string(),
        })
    }

    /// Recomputes the distances of every anomalous day in `range`.
    ///
    /// # Errors
    ///
    /// - `BackfillInProgress` if a run is already going for this employee
    /// - `NoAnomalies` if no day in the range is anomalous
    /// - `Credential` if the provider credential cannot be obtained
    /// - any error from the initial travel-detail fetch
    ///
    /// Failures on individual days do not fail the run; they are reported in
    /// the outcome, whose state is then `Failure`.
    pub async fn run(&self, employee_id: &str, range: DateRange) -> EngineResult<BackfillOutcome> {
        let _guard = self.try_start(employee_id)?;
        let started = Instant::now();
        let started_at = Utc::now();

        info!(
            employee_id,
            start_date = %range.start_date,
            end_date = %range.end_date,
            "Distance backfill started"
        );

        let details = self.travel.travel_details(Some(employee_id), range).await?;
        let anomalies = detect_anomalies(&details);
        if anomalies.is_empty() {
            return Err(EngineError::NoAnomalies {
                employee_id: employee_id.to_string(),
            });
        }

        if let Err(e) = self.provider.ensure_credential().await {
            warn!(employee_id, error = %e, "Distance backfill aborted");
            return Err(e);
        }

        let mut anomalous: Vec<&TravelDetail> =
            details.iter().filter(|d| d.is_anomalous()).collect();
        anomalous.sort_by_key(|d| d.date);

        let mut dates = Vec::with_capacity(anomalous.len());
        for detail in anomalous {
            dates.push(self.backfill_date(employee_id, detail).await);
        }

        let (travel_details, refetch_error) =
            match self.travel.travel_details(Some(employee_id), range).await {
                Ok(details) => (details, None),
                Err(e) => {
                    warn!(employee_id, error = %e, "Failed to re-fetch travel details");
                    (Vec::new(), Some(e.to_string()))
                }
            };
        let anomalies_after = refetch_error
            .is_none()
            .then(|| detect_anomalies(&travel_details).count);

        let state = if refetch_error.is_some() || dates.iter().any(DateOutcome::is_failed) {
            BackfillState::Failure
        } else {
            BackfillState::Success
        };

        let outcome = BackfillOutcome {
            run_id: Uuid::new_v4(),
            employee_id: employee_id.to_string(),
            range,
            state,
            anomalies_before: anomalies.count,
            anomalies_after,
            dates,
            travel_details,
            refetch_error,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            employee_id,
            run_id = %outcome.run_id,
            state = ?outcome.state,
            anomalies_before = outcome.anomalies_before,
            anomalies_after = ?outcome.anomalies_after,
            duration_us = started.elapsed().as_micros() as u64,
            "Distance backfill finished"
        );

        self.last_outcomes
            .insert(employee_id.to_string(), outcome.clone());
        Ok(outcome)
    }

    async fn backfill_date(&self, employee_id: &str, detail: &TravelDetail) -> DateOutcome {
        let date = detail.date;

        let distances = match self.recompute_distances(detail).await {
            Ok(distances) => distances,
            Err(e) => {
                warn!(employee_id, date = %date, error = %e, "Distance calculation failed");
                return DateOutcome::Failed {
                    date,
                    error: e.to_string(),
                };
            }
        };

        let Some(distances) = distances else {
            debug!(employee_id, date = %date, "No routable visit pair, skipping");
            return DateOutcome::Skipped {
                date,
                reason: "no consecutive visits with check-in coordinates".to_string(),
            };
        };

        if distances.car.is_zero() && distances.bike.is_zero() {
            debug!(employee_id, date = %date, "Routed distance is zero, skipping");
            return DateOutcome::Skipped {
                date,
                reason: "routed distance is zero".to_string(),
            };
        }

        let entry = TravelAllowanceEntry {
            employee_id: employee_id.to_string(),
            date,
            distance_travelled_by_car: distances.car,
            distance_travelled_by_bike: distances.bike,
        };

        match self.sink.create_travel_allowance(&entry).await {
            Ok(()) => {
                debug!(
                    employee_id,
                    date = %date,
                    car_km = %entry.distance_travelled_by_car,
                    bike_km = %entry.distance_travelled_by_bike,
                    "Wrote recomputed distances"
                );
                DateOutcome::Written {
                    date,
                    distance_travelled_by_car: entry.distance_travelled_by_car,
                    distance_travelled_by_bike: entry.distance_travelled_by_bike,
                    routed_pairs: distances.routed_pairs,
                }
            }
            Err(e) => {
                warn!(employee_id, date = %date, error = %e, "Failed to write distances");
                DateOutcome::Failed {
                    date,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Routes every consecutive pair of visits that both have coordinates.
    ///
    /// Each leg counts toward the vehicle of the visit it starts from.
    /// Returns `None` when no pair could be routed.
    async fn recompute_distances(
        &self,
        detail: &TravelDetail,
    ) -> EngineResult<Option<DayDistances>> {
        let mut distances = DayDistances::default();

        for pair in detail.visit_details.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            let (Some(origin), Some(destination)) =
                (from.checkin_coordinates(), to.checkin_coordinates())
            else {
                continue;
            };

            let meters = self
                .provider
                .route_distance_meters(origin, destination)
                .await?;
            let km = meters_to_km(meters)?;

            let bucket = match from.vehicle() {
                VehicleType::Car => &mut distances.car,
                VehicleType::Bike => &mut distances.bike,
            };
            *bucket = checked_sum([*bucket, km], "routed distance")?;
            distances.routed_pairs += 1;
        }

        Ok((distances.routed_pairs > 0).then_some(distances))
    }
}

#[derive(Debug, Default)]
struct DayDistances {
    car: Decimal,
    bike: Decimal,
    routed_pairs: usize,
}

/// Converts a provider distance to kilometres, to the metre.
fn meters_to_km(meters: f64) -> EngineResult<Decimal> {
    Decimal::from_f64_retain(meters)
        .filter(|m| !m.is_sign_negative())
        .map(|m| (m / Decimal::from(1000)).round_dp(3))
        .ok_or_else(|| EngineError::Provider {
            message: format!("invalid route distance: {}", meters),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, VisitDetail};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Mutex;
    use tokio::sync::{Notify, Semaphore};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    fn april() -> DateRange {
        DateRange::new(date(1), date(30)).unwrap()
    }

    fn visit(lat: Option<f64>, lng: Option<f64>, vehicle: Option<VehicleType>) -> VisitDetail {
        VisitDetail {
            checkin_latitude: lat,
            checkin_longitude: lng,
            vehicle_type: vehicle,
        }
    }

    fn anomalous_day(d: u32, visits: Vec<VisitDetail>) -> TravelDetail {
        TravelDetail {
            employee_id: "e1".to_string(),
            date: date(d),
            checkout_count: visits.len() as u32,
            total_distance_travelled: Decimal::ZERO,
            distance_travelled_by_car: Decimal::ZERO,
            distance_travelled_by_bike: Decimal::ZERO,
            visit_details: visits,
        }
    }

    /// Travel store that applies written entries to its records.
    struct FakeTravelStore {
        details: Mutex<Vec<TravelDetail>>,
        failing_write_dates: Vec<NaiveDate>,
        writes: Mutex<Vec<TravelAllowanceEntry>>,
        entered: Notify,
        release: Option<Semaphore>,
    }

    impl FakeTravelStore {
        fn new(details: Vec<TravelDetail>) -> Self {
            Self {
                details: Mutex::new(details),
                failing_write_dates: vec![],
                writes: Mutex::new(vec![]),
                entered: Notify::new(),
                release: None,
            }
        }
    }

    #[async_trait]
    impl TravelSource for FakeTravelStore {
        async fn travel_details(
            &self,
            employee_id: Option<&str>,
            range: DateRange,
        ) -> EngineResult<Vec<TravelDetail>> {
            self.entered.notify_one();
            if let Some(release) = &self.release {
                release.acquire().await.unwrap().forget();
            }
            Ok(self
                .details
                .lock()
                .unwrap()
                .iter()
                .filter(|d| employee_id.is_none_or(|id| d.employee_id == id))
                .filter(|d| range.contains_date(d.date))
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl TravelAllowanceSink for FakeTravelStore {
        async fn create_travel_allowance(&self, entry: &TravelAllowanceEntry) -> EngineResult<()> {
            if self.failing_write_dates.contains(&entry.date) {
                return Err(EngineError::Network {
                    endpoint: "/travel-allowance".to_string(),
                    message: "HTTP 500".to_string(),
                });
            }
            let mut details = self.details.lock().unwrap();
            if let Some(detail) = details
                .iter_mut()
                .find(|d| d.employee_id == entry.employee_id && d.date == entry.date)
            {
                detail.distance_travelled_by_car = entry.distance_travelled_by_car;
                detail.distance_travelled_by_bike = entry.distance_travelled_by_bike;
                detail.total_distance_travelled = entry.total_distance();
            }
            self.writes.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    /// Provider answering from a table keyed by origin latitude.
    struct FakeProvider {
        meters_by_origin_lat: HashMap<String, f64>,
        credential_ok: bool,
        calls: Mutex<Vec<(Coordinates, Coordinates)>>,
    }

    impl FakeProvider {
        fn new(entries: &[(f64, f64)]) -> Self {
            Self {
                meters_by_origin_lat: entries
                    .iter()
                    .map(|(lat, meters)| (lat.to_string(), *meters))
                    .collect(),
                credential_ok: true,
                calls: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl DistanceProvider for FakeProvider {
        async fn ensure_credential(&self) -> EngineResult<()> {
            if self.credential_ok {
                Ok(())
            } else {
                Err(EngineError::Credential {
                    message: "token exchange rejected".to_string(),
                })
            }
        }

        async fn route_distance_meters(
            &self,
            origin: Coordinates,
            destination: Coordinates,
        ) -> EngineResult<f64> {
            self.calls.lock().unwrap().push((origin, destination));
            self.meters_by_origin_lat
                .get(&origin.latitude.to_string())
                .copied()
                .ok_or_else(|| EngineError::Provider {
                    message: "no route".to_string(),
                })
        }
    }

    fn backfiller(provider: Arc<FakeProvider>, store: Arc<FakeTravelStore>) -> DistanceBackfiller {
        DistanceBackfiller::new(provider, store.clone(), store)
    }

    #[tokio::test]
    async fn test_legs_are_bucketed_by_starting_vehicle() {
        // A(car) -> B(bike) -> C: 12.5 km by car, 3.2 km by bike.
        let store = Arc::new(FakeTravelStore::new(vec![anomalous_day(
            2,
            vec![
                visit(Some(1.0), Some(1.0), Some(VehicleType::Car)),
                visit(Some(2.0), Some(2.0), Some(VehicleType::Bike)),
                visit(Some(3.0), Some(3.0), None),
            ],
        )]));
        let provider = Arc::new(FakeProvider::new(&[(1.0, 12500.0), (2.0, 3200.0)]));

        let outcome = backfiller(provider.clone(), store.clone())
            .run("e1", april())
            .await
            .unwrap();

        assert_eq!(outcome.state, BackfillState::Success);
        assert_eq!(outcome.anomalies_before, 1);
        assert_eq!(outcome.anomalies_after, Some(0));

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].distance_travelled_by_car, dec("12.5"));
        assert_eq!(writes[0].distance_travelled_by_bike, dec("3.2"));
        assert_eq!(provider.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_visit_without_vehicle_counts_as_bike() {
        let store = Arc::new(FakeTravelStore::new(vec![anomalous_day(
            2,
            vec![visit(Some(1.0), Some(1.0), None), visit(Some(2.0), Some(2.0), None)],
        )]));
        let provider = Arc::new(FakeProvider::new(&[(1.0, 4000.0)]));

        backfiller(provider, store.clone()).run("e1", april()).await.unwrap();

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes[0].distance_travelled_by_car, Decimal::ZERO);
        assert_eq!(writes[0].distance_travelled_by_bike, dec("4"));
    }

    #[tokio::test]
    async fn test_pairs_missing_coordinates_are_not_routed() {
        let store = Arc::new(FakeTravelStore::new(vec![
            anomalous_day(
                2,
                vec![
                    visit(Some(1.0), Some(1.0), Some(VehicleType::Car)),
                    visit(None, Some(2.0), None),
                    visit(Some(3.0), Some(3.0), None),
                ],
            ),
            anomalous_day(3, vec![visit(Some(1.0), None, None), visit(Some(3.0), Some(3.0), None)]),
        ]));
        let provider = Arc::new(FakeProvider::new(&[(1.0, 1000.0)]));

        let outcome = backfiller(provider.clone(), store.clone())
            .run("e1", april())
            .await
            .unwrap();

        assert!(provider.calls.lock().unwrap().is_empty());
        assert!(store.writes.lock().unwrap().is_empty());
        assert!(matches!(outcome.dates[0], DateOutcome::Skipped { .. }));
        assert!(matches!(outcome.dates[1], DateOutcome::Skipped { .. }));
        // Skipped days stay anomalous.
        assert_eq!(outcome.anomalies_after, Some(2));
        assert_eq!(outcome.state, BackfillState::Success);
    }

    #[tokio::test]
    async fn test_zero_routed_distance_is_skipped_without_write() {
        let store = Arc::new(FakeTravelStore::new(vec![anomalous_day(
            2,
            vec![visit(Some(1.0), Some(1.0), None), visit(Some(1.0), Some(1.0), None)],
        )]));
        let provider = Arc::new(FakeProvider::new(&[(1.0, 0.0)]));

        let outcome = backfiller(provider.clone(), store.clone())
            .run("e1", april())
            .await
            .unwrap();

        assert_eq!(provider.calls.lock().unwrap().len(), 1);
        assert!(store.writes.lock().unwrap().is_empty());
        match &outcome.dates[0] {
            DateOutcome::Skipped { reason, .. } => assert_eq!(reason, "routed distance is zero"),
            other => panic!("Expected Skipped, got {:?}", other),
        }
        assert_eq!(outcome.anomalies_after, Some(1));
        assert_eq!(outcome.state, BackfillState::Success);
    }

    #[tokio::test]
    async fn test_failed_day_does_not_stop_the_run() {
        let leg = |lat: f64| {
            vec![visit(Some(lat), Some(lat), None), visit(Some(2.0), Some(2.0), None)]
        };
        let mut store = FakeTravelStore::new(vec![
            anomalous_day(2, leg(1.0)),
            anomalous_day(3, leg(9.0)),
            anomalous_day(4, leg(1.0)),
            anomalous_day(5, leg(1.0)),
        ]);
        store.failing_write_dates = vec![date(4)];
        let store = Arc::new(store);
        // Latitude 9.0 has no route.
        let provider = Arc::new(FakeProvider::new(&[(1.0, 2000.0)]));
        let backfiller = backfiller(provider, store.clone());

        let outcome = backfiller.run("e1", april()).await.unwrap();

        assert_eq!(outcome.state, BackfillState::Failure);
        let days: Vec<NaiveDate> = outcome.dates.iter().map(DateOutcome::date).collect();
        assert_eq!(days, vec![date(2), date(3), date(4), date(5)]);
        assert!(matches!(outcome.dates[0], DateOutcome::Written { .. }));
        assert!(matches!(outcome.dates[1], DateOutcome::Failed { .. }));
        assert!(matches!(outcome.dates[2], DateOutcome::Failed { .. }));
        assert!(matches!(outcome.dates[3], DateOutcome::Written { .. }));
        assert_eq!(outcome.anomalies_after, Some(2));
        assert_eq!(store.writes.lock().unwrap().len(), 2);

        assert_eq!(backfiller.state("e1"), BackfillState::Idle);
        assert_eq!(backfiller.last_outcome("e1"), Some(outcome));
    }

    #[tokio::test]
    async fn test_no_anomalies_is_rejected() {
        let mut clean = anomalous_day(2, vec![]);
        clean.total_distance_travelled = dec("8");
        let store = Arc::new(FakeTravelStore::new(vec![clean]));
        let backfiller = backfiller(Arc::new(FakeProvider::new(&[])), store);

        let result = backfiller.run("e1", april()).await;

        assert!(matches!(result, Err(EngineError::NoAnomalies { .. })));
        assert_eq!(backfiller.state("e1"), BackfillState::Idle);
        assert!(backfiller.last_outcome("e1").is_none());
    }

    #[tokio::test]
    async fn test_credential_failure_aborts_before_any_write() {
        let store = Arc::new(FakeTravelStore::new(vec![anomalous_day(
            2,
            vec![visit(Some(1.0), Some(1.0), None), visit(Some(2.0), Some(2.0), None)],
        )]));
        let mut provider = FakeProvider::new(&[(1.0, 1000.0)]);
        provider.credential_ok = false;

        let result = backfiller(Arc::new(provider), store.clone())
            .run("e1", april())
            .await;

        assert!(matches!(result, Err(EngineError::Credential { .. })));
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_run_for_same_employee_is_rejected() {
        let mut store = FakeTravelStore::new(vec![anomalous_day(
            2,
            vec![visit(Some(1.0), Some(1.0), None), visit(Some(2.0), Some(2.0), None)],
        )]);
        store.release = Some(Semaphore::new(0));
        let store = Arc::new(store);
        let backfiller = Arc::new(backfiller(
            Arc::new(FakeProvider::new(&[(1.0, 1000.0)])),
            store.clone(),
        ));

        let first = tokio::spawn({
            let backfiller = backfiller.clone();
            async move { backfiller.run("e1", april()).await }
        });
        store.entered.notified().await;

        assert_eq!(backfiller.state("e1"), BackfillState::Calculating);
        let second = backfiller.run("e1", april()).await;
        assert!(matches!(second, Err(EngineError::BackfillInProgress { .. })));

        // Release the initial fetch and the re-fetch.
        if let Some(release) = &store.release {
            release.add_permits(2);
        }
        let outcome = first.await.unwrap().unwrap();
        assert_eq!(outcome.state, BackfillState::Success);
        assert_eq!(backfiller.state("e1"), BackfillState::Idle);
    }

    #[test]
    fn test_meters_to_km() {
        assert_eq!(meters_to_km(12500.0).unwrap(), dec("12.5"));
        assert_eq!(meters_to_km(1234.5678).unwrap(), dec("1.235"));
        assert!(meters_to_km(-1.0).is_err());
        assert!(meters_to_km(f64::NAN).is_err());
    }
}
