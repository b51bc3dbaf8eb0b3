//! Travel-distance backfill.
//!
//! Days where a checkout was recorded but no distance was captured get their
//! distances recomputed from visit coordinates through a routing provider, and
//! written back to the backend.

mod backfiller;
mod provider;
mod routing_client;

pub use backfiller::{BackfillOutcome, BackfillState, DateOutcome, DistanceBackfiller};
pub use provider::DistanceProvider;
pub use routing_client::RoutingClient;
