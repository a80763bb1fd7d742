//! # GreenGuard Server
//!
//! Ingestion service binary: wires the provider client, the Postgres
//! observation store, the per-parcel pipeline, and the dual-cadence
//! scheduler together, and serves the HTTP control surface alongside the
//! scheduling loop.
//!
//! The control surface is intentionally small:
//!
//! - `GET /health` — liveness plus a read-only cadence snapshot
//! - `GET /trigger/weather` — fire-and-forget weather batch cycle
//! - `GET /trigger/ndvi` — fire-and-forget vegetation batch cycle
//!
//! Trigger endpoints respond 200 immediately; the spawned cycle's outcome is
//! observable only through logs. There is no authentication on any of these
//! endpoints.

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::config::{Config, ConfigError};
