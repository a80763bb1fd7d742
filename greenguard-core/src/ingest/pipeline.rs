//! Per-parcel ingestion pipeline.
//!
//! One batch cycle applies the pipeline to every monitored parcel for one
//! signal. Failures are isolated per parcel: a provider error or a bad
//! record for one parcel never aborts the batch, and a cycle's outcome is
//! simply the union of whatever observations got written. Cycles have no
//! success/failure return value; failures are observable through logs only.

use crate::database::ObservationStore;
use crate::error::Result;
use crate::provider::AgroProvider;
use crate::types::{NewObservation, Parcel, Signal};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Soil-moisture proxy derived from relative humidity. A deliberately crude
/// estimate, not a physical model; an absent input stays absent rather than
/// becoming zero.
pub fn soil_moisture_estimate(humidity: Option<f64>) -> Option<f64> {
    humidity.map(|h| h * 0.6)
}

/// Drought-risk heuristic, clamped to [0, 1]. Missing rainfall and missing
/// temperature are treated as 0.
pub fn drought_risk(temperature: Option<f64>, rainfall_1h: Option<f64>) -> f64 {
    let temp = temperature.unwrap_or(0.0);
    let rain = rainfall_1h.unwrap_or(0.0);
    let risk = (temp - 25.0) / 20.0 - rain / 10.0;
    round3(risk.clamp(0.0, 1.0))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Fetches, transforms, and persists one signal for one parcel at a time.
pub struct IngestPipeline {
    provider: Arc<dyn AgroProvider>,
    store: Arc<dyn ObservationStore>,
}

impl std::fmt::Debug for IngestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestPipeline").finish_non_exhaustive()
    }
}

impl IngestPipeline {
    pub fn new(provider: Arc<dyn AgroProvider>, store: Arc<dyn ObservationStore>) -> Self {
        Self { provider, store }
    }

    /// Run one best-effort batch cycle for a signal across all monitored
    /// parcels, in listing order. A listing failure ends the cycle; any
    /// per-parcel failure is logged and the next parcel is still attempted.
    pub async fn run_cycle(&self, signal: Signal) {
        info!(%signal, "batch cycle started");

        let parcels = match self.store.list_monitored_parcels().await {
            Ok(parcels) => parcels,
            Err(e) => {
                error!(%signal, error = %e, "failed to list monitored parcels");
                return;
            }
        };
        info!(%signal, parcels = parcels.len(), "monitored parcels listed");

        for parcel in &parcels {
            // Listing already filters these out, but a parcel without a
            // polygon must never reach the provider or the store.
            let Some(polygon_id) = parcel.polygon_id.as_deref() else {
                debug!(parcel = %parcel.name, "no polygon reference, skipping");
                continue;
            };

            let outcome = match signal {
                Signal::Weather => self.ingest_weather(parcel, polygon_id).await,
                Signal::Ndvi => self.ingest_ndvi(parcel, polygon_id).await,
            };

            if let Err(e) = outcome {
                warn!(%signal, parcel = %parcel.name, error = %e, "parcel skipped this cycle");
            }
        }
    }

    /// Fetch current weather for one parcel, derive the secondary estimates,
    /// and append a single observation. A failed fetch skips the parcel with
    /// no partial write.
    async fn ingest_weather(&self, parcel: &Parcel, polygon_id: &str) -> Result<()> {
        let reading = self.provider.fetch_current_weather(polygon_id).await?;

        let soil_moisture = soil_moisture_estimate(reading.humidity());
        let risk = drought_risk(reading.temperature(), reading.rainfall_1h());

        self.store
            .append_observation(
                &parcel.id,
                NewObservation {
                    weather: Some(reading.payload),
                    soil_moisture,
                    drought_risk: Some(risk),
                    ..Default::default()
                },
            )
            .await
    }

    /// Fetch the latest vegetation-index sample for one parcel and append an
    /// observation carrying just the index value. Absent imagery or a sample
    /// without a mean skips the parcel without a write.
    async fn ingest_ndvi(&self, parcel: &Parcel, polygon_id: &str) -> Result<()> {
        let Some(reading) = self.provider.fetch_latest_ndvi(polygon_id).await? else {
            debug!(parcel = %parcel.name, "no recent ndvi imagery");
            return Ok(());
        };

        let Some(mean) = reading.mean else {
            debug!(parcel = %parcel.name, "ndvi sample has no mean, skipping");
            return Ok(());
        };

        info!(parcel = %parcel.name, ndvi = mean, "ndvi sample ingested");
        self.store
            .append_observation(
                &parcel.id,
                NewObservation {
                    ndvi: Some(mean),
                    ..Default::default()
                },
            )
            .await
    }
}
