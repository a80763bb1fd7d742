use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{handlers, infra::app_state::AppState};

/// Build the control-surface router. Liveness and the manual triggers run
/// concurrently with the scheduling loop; unknown routes fall through to 404.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/trigger/weather", get(handlers::trigger_weather))
        .route("/trigger/ndvi", get(handlers::trigger_ndvi))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
