//! The routing service seam.

use async_trait::async_trait;

use crate::error::EngineResult;
use crate::models::Coordinates;

/// Computes road distances between two points.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    /// Makes sure a usable credential is held, obtaining one if needed.
    ///
    /// Fails with `Credential` when none can be obtained.
    async fn ensure_credential(&self) -> EngineResult<()>;

    /// Road distance in meters from `origin` to `destination`.
    async fn route_distance_meters(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> EngineResult<f64>;
}
