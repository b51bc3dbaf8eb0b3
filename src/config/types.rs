//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::sources::RetryPolicy;

/// HTTP listener and logging settings from `service.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Address the API listens on (e.g., "0.0.0.0:8080").
    pub listen_addr: String,
    /// Default log filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Timeout and retry settings for an outbound HTTP client.
///
/// Retries default to zero; they must be turned on explicitly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HttpSettings {
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries after the first attempt, for network failures only.
    #[serde(default)]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound on the delay between retries in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_initial_backoff_ms() -> u64 {
    200
}

fn default_max_backoff_ms() -> u64 {
    5_000
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_retries: 0,
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl HttpSettings {
    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The retry policy these settings describe.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

/// Paths of the backend endpoints, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackendEndpoints {
    /// Lists every employee.
    #[serde(default = "default_employees_path")]
    pub employees: String,
    /// Attendance log over a date range.
    #[serde(default = "default_attendance_path")]
    pub attendance: String,
    /// Travel details over a date range.
    #[serde(default = "default_travel_details_path")]
    pub travel_details: String,
    /// Creates a travel-allowance entry.
    #[serde(default = "default_travel_allowance_path")]
    pub travel_allowance: String,
    /// Expense claims over a date range.
    #[serde(default = "default_expenses_path")]
    pub expenses: String,
}

fn default_employees_path() -> String {
    "/employees".to_string()
}

fn default_attendance_path() -> String {
    "/attendance/log".to_string()
}

fn default_travel_details_path() -> String {
    "/travel-allowance/details".to_string()
}

fn default_travel_allowance_path() -> String {
    "/travel-allowance".to_string()
}

fn default_expenses_path() -> String {
    "/expenses".to_string()
}

impl Default for BackendEndpoints {
    fn default() -> Self {
        Self {
            employees: default_employees_path(),
            attendance: default_attendance_path(),
            travel_details: default_travel_details_path(),
            travel_allowance: default_travel_allowance_path(),
            expenses: default_expenses_path(),
        }
    }
}

/// Backend connection settings from `backend.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend REST API.
    pub base_url: String,
    /// Environment variable holding the backend bearer token, if one is needed.
    #[serde(default)]
    pub api_token_env: Option<String>,
    /// Endpoint paths.
    #[serde(default)]
    pub endpoints: BackendEndpoints,
    /// Timeout and retry settings.
    #[serde(default)]
    pub http: HttpSettings,
}

/// Routing provider settings from `distance_provider.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct DistanceProviderConfig {
    /// Client-credentials token endpoint.
    pub token_url: String,
    /// Route distance endpoint.
    pub route_url: String,
    /// OAuth client id.
    pub client_id: String,
    /// Environment variable holding the OAuth client secret.
    pub client_secret_env: String,
    /// OAuth scope to request, if the provider needs one.
    #[serde(default)]
    pub scope: Option<String>,
    /// Refresh the token this many seconds before it expires.
    #[serde(default = "default_token_refresh_skew_secs")]
    pub token_refresh_skew_secs: u64,
    /// Timeout and retry settings.
    #[serde(default)]
    pub http: HttpSettings,
}

fn default_token_refresh_skew_secs() -> u64 {
    60
}

impl DistanceProviderConfig {
    /// Reads the client secret from the configured environment variable.
    ///
    /// A missing secret is a credential failure: it disables backfills
    /// without affecting report generation.
    pub fn client_secret(&self) -> EngineResult<String> {
        std::env::var(&self.client_secret_env).map_err(|_| EngineError::Credential {
            message: format!(
                "environment variable '{}' is not set",
                self.client_secret_env
            ),
        })
    }

    /// How long before expiry a cached token is considered stale.
    pub fn token_refresh_skew(&self) -> Duration {
        Duration::from_secs(self.token_refresh_skew_secs)
    }
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    service: ServiceConfig,
    backend: BackendConfig,
    distance_provider: DistanceProviderConfig,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        service: ServiceConfig,
        backend: BackendConfig,
        distance_provider: DistanceProviderConfig,
    ) -> Self {
        Self {
            service,
            backend,
            distance_provider,
        }
    }

    /// Returns the service settings.
    pub fn service(&self) -> &ServiceConfig {
        &self.service
    }

    /// Returns the backend settings.
    pub fn backend(&self) -> &BackendConfig {
        &self.backend
    }

    /// Returns the routing provider settings.
    pub fn distance_provider(&self) -> &DistanceProviderConfig {
        &self.distance_provider
    }
}
