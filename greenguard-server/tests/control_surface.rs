//! Control-surface integration tests: liveness, manual triggers, and the
//! fire-and-forget contract, exercised against stubbed provider and store.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use greenguard_core::{
    AgroProvider, CadenceSnapshot, IngestError, IngestPipeline, NewObservation,
    ObservationStore, Parcel, VegetationReading, WeatherReading,
};
use greenguard_server::{AppState, Config, routes};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Provider stub with an artificial delay, to observe that trigger endpoints
/// respond before the fetch completes.
struct SlowProvider {
    delay: Duration,
}

#[async_trait]
impl AgroProvider for SlowProvider {
    async fn fetch_current_weather(
        &self,
        _polygon_id: &str,
    ) -> Result<WeatherReading, IngestError> {
        tokio::time::sleep(self.delay).await;
        Ok(WeatherReading {
            payload: json!({ "main": { "temp": 28.0, "humidity": 70 } }),
        })
    }

    async fn fetch_latest_ndvi(
        &self,
        _polygon_id: &str,
    ) -> Result<Option<VegetationReading>, IngestError> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(VegetationReading {
            dt: None,
            mean: Some(0.47),
        }))
    }
}

#[derive(Default)]
struct RecordingStore {
    appended: Mutex<Vec<(String, NewObservation)>>,
}

impl RecordingStore {
    fn appended(&self) -> Vec<(String, NewObservation)> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObservationStore for RecordingStore {
    async fn list_monitored_parcels(&self) -> Result<Vec<Parcel>, IngestError> {
        Ok(vec![Parcel {
            id: "farm-1".into(),
            name: "North Field".into(),
            polygon_id: Some("poly-1".into()),
        }])
    }

    async fn append_observation(
        &self,
        parcel_id: &str,
        observation: NewObservation,
    ) -> Result<(), IngestError> {
        self.appended
            .lock()
            .unwrap()
            .push((parcel_id.to_string(), observation));
        Ok(())
    }
}

fn test_config() -> Config {
    // Built directly rather than from the environment so tests never depend
    // on ambient variables.
    Config {
        server_host: "127.0.0.1".into(),
        server_port: 0,
        database_url: "postgres://unused".into(),
        agro_api_key: "test-key".into(),
        agro_base_url: "http://localhost:0".into(),
        weather_interval_secs: 3_600,
        ndvi_interval_secs: 5 * 86_400,
    }
}

fn server_with(delay: Duration) -> (TestServer, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::default());
    let pipeline = Arc::new(IngestPipeline::new(
        Arc::new(SlowProvider { delay }),
        store.clone(),
    ));
    let (_tx, cadences) = watch::channel(CadenceSnapshot::default());
    let state = AppState {
        pipeline,
        cadences,
        config: Arc::new(test_config()),
    };
    let server = TestServer::new(routes::create_router(state)).expect("router");
    (server, store)
}

async fn wait_for_writes(store: &RecordingStore, count: usize) -> Vec<(String, NewObservation)> {
    for _ in 0..100 {
        let appended = store.appended();
        if appended.len() >= count {
            return appended;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("store never reached {count} writes: {:?}", store.appended());
}

#[tokio::test]
async fn health_reports_status_and_cadences() {
    let (server, _store) = server_with(Duration::ZERO);

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "greenguard-ingest");
    assert!(body["timestamp"].is_string());
    assert_eq!(body["cadences"]["last_weather_run"], Value::Null);
}

#[tokio::test]
async fn unknown_routes_return_404() {
    let (server, _store) = server_with(Duration::ZERO);

    let response = server.get("/metrics").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn weather_trigger_returns_before_the_fetch_completes() {
    let (server, store) = server_with(Duration::from_millis(300));

    let response = server.get("/trigger/weather").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Weather fetch triggered");
    // fire-and-forget: the slow fetch is still in flight when we get the 200
    assert!(store.appended().is_empty());

    let appended = wait_for_writes(&store, 1).await;
    assert_eq!(appended[0].0, "farm-1");
    assert!(appended[0].1.weather.is_some());
    assert_eq!(appended[0].1.soil_moisture, Some(42.0));
}

#[tokio::test]
async fn ndvi_trigger_runs_a_vegetation_cycle() {
    let (server, store) = server_with(Duration::ZERO);

    let response = server.get("/trigger/ndvi").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "NDVI fetch triggered");

    let appended = wait_for_writes(&store, 1).await;
    assert_eq!(appended[0].1.ndvi, Some(0.47));
    assert!(appended[0].1.weather.is_none());
}

#[tokio::test]
async fn concurrent_triggers_each_run_their_own_cycle() {
    let (server, store) = server_with(Duration::from_millis(50));

    let (w, n) = tokio::join!(
        async { server.get("/trigger/weather").await },
        async { server.get("/trigger/ndvi").await },
    );

    assert_eq!(w.status_code(), StatusCode::OK);
    assert_eq!(n.status_code(), StatusCode::OK);

    let appended = wait_for_writes(&store, 2).await;
    assert!(appended.iter().any(|(_, o)| o.weather.is_some()));
    assert!(appended.iter().any(|(_, o)| o.ndvi.is_some()));
}
