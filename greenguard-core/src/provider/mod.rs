//! Provider client for the AgroMonitoring API.
//!
//! The client wraps two read-only calls (current weather, NDVI history)
//! behind the [`AgroProvider`] trait so the pipeline can be exercised against
//! stubs in tests. There is no retry here; retry policy belongs to the
//! caller's cadence, so a failed fetch simply waits for the next cycle.

mod agro_api;

pub use agro_api::AgroApiProvider;

use crate::error::Result;
use crate::types::{VegetationReading, WeatherReading};
use async_trait::async_trait;

#[async_trait]
pub trait AgroProvider: Send + Sync {
    /// Fetch current conditions for a polygon. Network or timeout failures
    /// are `ProviderUnavailable`; a non-success status or malformed body is
    /// `ProviderBadResponse`.
    async fn fetch_current_weather(&self, polygon_id: &str) -> Result<WeatherReading>;

    /// Fetch the latest vegetation-index sample over a trailing 30-day
    /// window. `Ok(None)` means no recent imagery exists, which is expected
    /// and not an error.
    async fn fetch_latest_ndvi(&self, polygon_id: &str) -> Result<Option<VegetationReading>>;
}
