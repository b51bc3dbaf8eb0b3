//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine can surface: configuration problems, invalid
//! input, backend and routing-provider failures, and backfill guard rejections.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// Missing numeric fields on employee or travel records are never reported
/// through this type; they are normalised to zero instead.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/backend.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/backend.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An input value was rejected before any calculation ran.
    #[error("Invalid value for '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// A request to the backend failed at the transport or HTTP level.
    #[error("Request to '{endpoint}' failed: {message}")]
    Network {
        /// The endpoint that was called.
        endpoint: String,
        /// A description of the failure.
        message: String,
    },

    /// The backend refused a request with a client error status.
    #[error("Request to '{endpoint}' was rejected with HTTP {status}: {message}")]
    UpstreamRejected {
        /// The endpoint that was called.
        endpoint: String,
        /// The HTTP status code returned.
        status: u16,
        /// The response body or a description of the rejection.
        message: String,
    },

    /// The routing provider answered but the answer was unusable.
    #[error("Distance provider error: {message}")]
    Provider {
        /// A description of the provider failure.
        message: String,
    },

    /// The routing provider credential could not be obtained.
    #[error("Distance provider credential unavailable: {message}")]
    Credential {
        /// A description of the credential failure.
        message: String,
    },

    /// A backfill is already running for this employee.
    #[error("A distance backfill is already running for employee '{employee_id}'")]
    BackfillInProgress {
        /// The employee whose run is in progress.
        employee_id: String,
    },

    /// The backfill was triggered for an employee with no anomalous days.
    #[error("No anomalous travel days to backfill for employee '{employee_id}'")]
    NoAnomalies {
        /// The employee that was checked.
        employee_id: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Returns true when retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Network { .. })
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/backend.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/backend.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_validation_displays_field_and_message() {
        let error = EngineError::Validation {
            field: "month".to_string(),
            message: "must be between 1 and 12".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid value for 'month': must be between 1 and 12"
        );
    }

    #[test]
    fn test_backfill_in_progress_displays_employee() {
        let error = EngineError::BackfillInProgress {
            employee_id: "emp_7".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "A distance backfill is already running for employee 'emp_7'"
        );
    }

    #[test]
    fn test_only_network_errors_are_retryable() {
        let network = EngineError::Network {
            endpoint: "/travel".to_string(),
            message: "connection reset".to_string(),
        };
        let rejected = EngineError::UpstreamRejected {
            endpoint: "/travel-allowance".to_string(),
            status: 400,
            message: "duplicate entry".to_string(),
        };
        let provider = EngineError::Provider {
            message: "no routes".to_string(),
        };
        let credential = EngineError::Credential {
            message: "401".to_string(),
        };

        assert!(network.is_retryable());
        assert!(!rejected.is_retryable());
        assert!(!provider.is_retryable());
        assert!(!credential.is_retryable());
    }

    #[test]
    fn test_upstream_rejected_displays_status() {
        let error = EngineError::UpstreamRejected {
            endpoint: "/travel-allowance".to_string(),
            status: 409,
            message: "entry exists".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Request to '/travel-allowance' was rejected with HTTP 409: entry exists"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_credential_error() -> EngineResult<()> {
            Err(EngineError::Credential {
                message: "token exchange rejected".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_credential_error()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
