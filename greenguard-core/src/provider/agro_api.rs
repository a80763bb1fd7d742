use crate::error::{IngestError, Result};
use crate::provider::AgroProvider;
use crate::types::{VegetationReading, WeatherReading};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const NDVI_WINDOW_SECS: i64 = 30 * 86_400;

/// HTTP client for the AgroMonitoring API, authenticated via a static API
/// key query parameter.
#[derive(Debug, Clone)]
pub struct AgroApiProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AgroApiProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(IngestError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::ProviderBadResponse(format!(
                "{path} request failed with status {status}"
            )));
        }

        response.json().await.map_err(IngestError::from_transport)
    }
}

#[async_trait]
impl AgroProvider for AgroApiProvider {
    async fn fetch_current_weather(&self, polygon_id: &str) -> Result<WeatherReading> {
        let body = self.get_json("/weather", &[("polyid", polygon_id)]).await?;
        weather_from_body(body)
    }

    async fn fetch_latest_ndvi(&self, polygon_id: &str) -> Result<Option<VegetationReading>> {
        let end = Utc::now().timestamp();
        let start = end - NDVI_WINDOW_SECS;
        let body = self
            .get_json(
                "/ndvi/history",
                &[
                    ("polyid", polygon_id),
                    ("start", &start.to_string()),
                    ("end", &end.to_string()),
                ],
            )
            .await?;
        latest_ndvi_from_body(body)
    }
}

/// Normalize a current-weather body. The provider sometimes wraps the
/// conditions object in an array envelope; unwrap to its first element.
fn weather_from_body(body: Value) -> Result<WeatherReading> {
    let payload = match body {
        Value::Array(mut entries) => {
            if entries.is_empty() {
                return Err(IngestError::ProviderBadResponse(
                    "weather response was an empty array".into(),
                ));
            }
            entries.swap_remove(0)
        }
        other => other,
    };

    if !payload.is_object() {
        return Err(IngestError::ProviderBadResponse(format!(
            "unexpected weather payload: {payload}"
        )));
    }

    Ok(WeatherReading { payload })
}

/// Take the chronologically latest sample from an NDVI history body. The
/// provider returns entries in chronological order; an empty history is
/// `None`, not an error.
fn latest_ndvi_from_body(body: Value) -> Result<Option<VegetationReading>> {
    let Value::Array(entries) = body else {
        return Err(IngestError::ProviderBadResponse(format!(
            "unexpected ndvi history payload: {body}"
        )));
    };

    let Some(latest) = entries.into_iter().next_back() else {
        return Ok(None);
    };

    serde_json::from_value(latest)
        .map(Some)
        .map_err(|e| IngestError::ProviderBadResponse(format!("undecodable ndvi entry: {e}")))
}
