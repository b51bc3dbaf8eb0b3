//! HTTP API module for the payroll engine.
//!
//! This module provides the REST endpoints for salary reports, travel anomaly
//! scans and distance backfills.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AnomalyRequest, BackfillRequest, SalaryReportParams, SalaryReportRequest};
pub use response::{ApiError, BackfillStatusResponse};
pub use state::AppState;
