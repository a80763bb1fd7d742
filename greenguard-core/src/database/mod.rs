//! Observation store port and its Postgres implementation.

mod postgres;

pub use postgres::PostgresStore;

use crate::error::Result;
use crate::types::{NewObservation, Parcel};
use async_trait::async_trait;

#[async_trait]
pub trait ObservationStore: Send + Sync {
    /// List parcels eligible for ingestion, i.e. those with a polygon
    /// reference. An empty listing is valid and causes a no-op cycle.
    async fn list_monitored_parcels(&self) -> Result<Vec<Parcel>>;

    /// Append one observation row for a parcel. Each call is a single atomic
    /// write with a server-assigned id and timestamp. Errors are returned to
    /// the caller, which logs them; they never cross the pipeline boundary.
    async fn append_observation(&self, parcel_id: &str, observation: NewObservation)
    -> Result<()>;
}
