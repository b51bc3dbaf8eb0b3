//! Field-force payroll engine.
//!
//! This crate computes monthly salaries for field staff from attendance,
//! travel and expense records, flags days whose travel distance is missing,
//! and backfills those distances through a routing provider.

#![warn(missing_docs)]

pub mod api;
pub mod backfill;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod sources;
pub mod telemetry;
