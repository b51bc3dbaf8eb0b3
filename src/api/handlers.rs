//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::detect_anomalies;
use crate::error::EngineError;
use crate::report::build_salary_report;

use super::request::{AnomalyRequest, BackfillRequest, SalaryReportParams, SalaryReportRequest};
use super::response::{ApiError, ApiErrorResponse, BackfillStatusResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/salary/report",
            post(report_from_snapshot_handler).get(report_from_backend_handler),
        )
        .route("/travel/anomalies", post(anomalies_handler))
        .route(
            "/employees/:employee_id/backfill",
            post(start_backfill_handler).get(backfill_status_handler),
        )
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, error: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %error,
        "Request failed"
    );
    let api_error: ApiErrorResponse = error.into();
    json_response(api_error.status, api_error.error)
}

/// Turns a body rejection into a 400 with a useful message.
fn json_rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

fn server_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Handler for `POST /salary/report`.
///
/// Computes a report from the records in the request body.
async fn report_from_snapshot_handler(
    payload: Result<Json<SalaryReportRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing salary report request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let query = match request.report_query() {
        Ok(query) => query,
        Err(err) => return error_response(correlation_id, err),
    };
    let today = request.today.unwrap_or_else(server_today);

    let start_time = Instant::now();
    match build_salary_report(&request.snapshot, &query, today) {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                pay_month = %query.pay_month,
                employees = report.lines.len(),
                total_salary = %report.totals.total_salary,
                duration_us = start_time.elapsed().as_micros() as u64,
                "Salary report completed"
            );
            json_response(StatusCode::OK, report)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `GET /salary/report`.
///
/// Fetches the month's records from the backend, then computes the report.
async fn report_from_backend_handler(
    State(state): State<AppState>,
    params: Result<Query<SalaryReportParams>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing salary report fetch");

    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            warn!(
                correlation_id = %correlation_id,
                error = %rejection.body_text(),
                "Invalid query string"
            );
            return json_response(
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(rejection.body_text()),
            );
        }
    };

    let query = match params.report_query() {
        Ok(query) => query,
        Err(err) => return error_response(correlation_id, err),
    };
    let today = params.today.unwrap_or_else(server_today);

    let start_time = Instant::now();
    let snapshot = match state
        .sources()
        .fetch_snapshot(query.pay_month.date_range())
        .await
    {
        Ok(snapshot) => snapshot,
        Err(err) => return error_response(correlation_id, err),
    };

    match build_salary_report(&snapshot, &query, today) {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                pay_month = %query.pay_month,
                employees = report.lines.len(),
                total_salary = %report.totals.total_salary,
                duration_us = start_time.elapsed().as_micros() as u64,
                "Salary report completed"
            );
            json_response(StatusCode::OK, report)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /travel/anomalies`.
async fn anomalies_handler(payload: Result<Json<AnomalyRequest>, JsonRejection>) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let report = detect_anomalies(&request.travel_details);
    info!(
        correlation_id = %correlation_id,
        details = request.travel_details.len(),
        anomalies = report.count,
        "Anomaly scan completed"
    );
    json_response(StatusCode::OK, report)
}

/// Handler for `POST /employees/:employee_id/backfill`.
///
/// Runs the backfill to completion and returns its outcome.
async fn start_backfill_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    payload: Result<Json<BackfillRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        "Processing backfill request"
    );

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let range = match request.date_range() {
        Ok(range) => range,
        Err(err) => return error_response(correlation_id, err),
    };

    match state.backfiller().run(&employee_id, range).await {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %employee_id,
                run_id = %outcome.run_id,
                state = ?outcome.state,
                "Backfill request completed"
            );
            json_response(StatusCode::OK, outcome)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `GET /employees/:employee_id/backfill`.
async fn backfill_status_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Response {
    let backfiller = state.backfiller();
    let status = BackfillStatusResponse {
        state: backfiller.state(&employee_id),
        last_outcome: backfiller.last_outcome(&employee_id),
        employee_id,
    };
    json_response(StatusCode::OK, status)
}
