//! Configuration loading and management for the payroll engine.
//!
//! This module loads the service, backend and routing provider settings from
//! YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Listening on {}", config.service().listen_addr);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BackendConfig, BackendEndpoints, DistanceProviderConfig, EngineConfig, HttpSettings,
    ServiceConfig,
};
