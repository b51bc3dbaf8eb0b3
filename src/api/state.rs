//! Application state for the payroll engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::backfill::{DistanceBackfiller, RoutingClient};
use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::sources::{BackendClient, RecordSources};

/// Shared application state.
///
/// Holds the record sources reports are fetched from and the backfiller,
/// whose in-progress set must be shared by every request.
#[derive(Clone)]
pub struct AppState {
    sources: RecordSources,
    backfiller: Arc<DistanceBackfiller>,
}

impl AppState {
    /// Creates a new application state from its parts.
    pub fn new(sources: RecordSources, backfiller: Arc<DistanceBackfiller>) -> Self {
        Self {
            sources,
            backfiller,
        }
    }

    /// Wires the backend and routing clients described by the configuration.
    pub fn from_config(config: &ConfigLoader) -> EngineResult<Self> {
        let backend = Arc::new(BackendClient::new(config.backend())?);
        let routing = Arc::new(RoutingClient::new(config.distance_provider())?);
        let backfiller = DistanceBackfiller::new(routing, backend.clone(), backend.clone());

        Ok(Self::new(
            RecordSources::from_backend(backend),
            Arc::new(backfiller),
        ))
    }

    /// Returns the record sources.
    pub fn sources(&self) -> &RecordSources {
        &self.sources
    }

    /// Returns the distance backfiller.
    pub fn backfiller(&self) -> &DistanceBackfiller {
        &self.backfiller
    }
}
