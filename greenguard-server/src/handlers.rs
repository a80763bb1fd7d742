use crate::infra::app_state::AppState;
use axum::{
    Json,
    extract::State,
    http::{StatusCode, Uri},
};
use chrono::Utc;
use greenguard_core::Signal;
use serde_json::{Value, json};
use tracing::info;

pub const SERVICE_NAME: &str = "greenguard-ingest";

/// Liveness probe. No side effects; succeeds whenever the process is alive.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let cadences = *state.cadences.borrow();

    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": Utc::now().to_rfc3339(),
        "cadences": cadences,
    }))
}

pub async fn trigger_weather(State(state): State<AppState>) -> Json<Value> {
    spawn_cycle(&state, Signal::Weather);
    Json(json!({ "message": "Weather fetch triggered" }))
}

pub async fn trigger_ndvi(State(state): State<AppState>) -> Json<Value> {
    spawn_cycle(&state, Signal::Ndvi);
    Json(json!({ "message": "NDVI fetch triggered" }))
}

/// Launch a batch cycle without waiting for the scheduler's next due time.
/// Fire-and-forget: no handle is kept, the caller cannot observe completion,
/// and the scheduler's cadence state is left untouched, so a manual run
/// neither delays nor advances the next scheduled cycle.
fn spawn_cycle(state: &AppState, signal: Signal) {
    info!(%signal, "manual cycle triggered");
    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        pipeline.run_cycle(signal).await;
    });
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "message": format!("no route for {}", uri.path()),
                "status": 404,
            }
        })),
    )
}
