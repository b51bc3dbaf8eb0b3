//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{
    BackendConfig, DistanceProviderConfig, EngineConfig, ServiceConfig,
};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── service.yaml            # Listen address and log level
/// ├── backend.yaml            # Backend base URL, endpoint paths, HTTP settings
/// └── distance_provider.yaml  # Routing provider URLs and credentials
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Backend: {}", loader.backend().base_url);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML or misses a required field
    ///   (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let service = Self::load_yaml::<ServiceConfig>(&path.join("service.yaml"))?;
        let backend = Self::load_yaml::<BackendConfig>(&path.join("backend.yaml"))?;
        let distance_provider =
            Self::load_yaml::<DistanceProviderConfig>(&path.join("distance_provider.yaml"))?;

        Ok(Self {
            config: EngineConfig::new(service, backend, distance_provider),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the service settings.
    pub fn service(&self) -> &ServiceConfig {
        self.config.service()
    }

    /// Returns the backend settings.
    pub fn backend(&self) -> &BackendConfig {
        self.config.backend()
    }

    /// Returns the routing provider settings.
    pub fn distance_provider(&self) -> &DistanceProviderConfig {
        self.config.distance_provider()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_path() -> &'static str {
        "./config/default"
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.service().listen_addr, "0.0.0.0:8080");
        assert_eq!(loader.service().log_level, "info");
    }

    #[test]
    fn test_backend_settings_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let backend = loader.backend();
        assert_eq!(backend.base_url, "http://localhost:4000/api");
        assert_eq!(backend.endpoints.travel_allowance, "/travel-allowance");
        assert_eq!(backend.http.timeout_ms, 15_000);
        assert_eq!(backend.http.max_retries, 2);
    }

    #[test]
    fn test_distance_provider_settings_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let provider = loader.distance_provider();
        assert_eq!(provider.client_id, "sfa-dashboard");
        assert_eq!(provider.client_secret_env, "ROUTING_CLIENT_SECRET");
        assert_eq!(provider.scope.as_deref(), Some("openid"));
        assert_eq!(provider.http.max_retries, 0);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("service.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }
}
