//! Domain types shared across the ingestion core.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A monitored land area. Parcels are created and owned externally (the
/// `"Farm"` table); the ingestion core only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Parcel {
    pub id: String,
    pub name: String,
    /// External provider polygon reference. Parcels without one are excluded
    /// from ingestion.
    #[sqlx(rename = "polygonId")]
    #[serde(rename = "polygonId")]
    pub polygon_id: Option<String>,
}

/// The two signal kinds, each with its own cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Weather,
    Ndvi,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Weather => write!(f, "weather"),
            Signal::Ndvi => write!(f, "ndvi"),
        }
    }
}

/// A normalized current-conditions reading from the provider.
///
/// The payload is kept verbatim for persistence (the store treats it as
/// opaque JSON); the accessors pull out the handful of fields the pipeline
/// derives estimates from.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub payload: Value,
}

impl WeatherReading {
    pub fn temperature(&self) -> Option<f64> {
        self.payload.pointer("/main/temp").and_then(Value::as_f64)
    }

    pub fn humidity(&self) -> Option<f64> {
        self.payload.pointer("/main/humidity").and_then(Value::as_f64)
    }

    pub fn rainfall_1h(&self) -> Option<f64> {
        self.payload.pointer("/rain/1h").and_then(Value::as_f64)
    }
}

/// The latest vegetation-index sample for a polygon, taken from the
/// provider's trailing history window.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct VegetationReading {
    /// Sample timestamp (unix seconds) as reported by the provider.
    #[serde(default)]
    pub dt: Option<i64>,
    /// Mean index value over the polygon. Missing mean means the sample is
    /// unusable and the parcel is skipped for the cycle.
    #[serde(default, rename = "data", deserialize_with = "mean_from_data")]
    pub mean: Option<f64>,
}

fn mean_from_data<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct DataBlock {
        #[serde(default)]
        mean: Option<f64>,
    }

    let block = Option::<DataBlock>::deserialize(deserializer)?;
    Ok(block.and_then(|b| b.mean))
}

/// One observation to append for a parcel. Weather-derived and vegetation
/// fields are written by independent cadences; a single row may carry either
/// or both. Rows are append-only with a server-assigned id and timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewObservation {
    pub ndvi: Option<f64>,
    pub weather: Option<Value>,
    pub soil_moisture: Option<f64>,
    pub drought_risk: Option<f64>,
}
