//! # GreenGuard Core
//!
//! Core library for the GreenGuard ingestion service: pulls agronomic
//! signals (current weather, vegetation index) for registered land parcels
//! from the AgroMonitoring API and persists them as append-only, timestamped
//! observations in PostgreSQL.
//!
//! ## Architecture
//!
//! The crate is organized into a few key modules:
//!
//! - [`types`]: parcels, provider readings, and observation records
//! - [`provider`]: the AgroMonitoring client behind the [`provider::AgroProvider`] trait
//! - [`database`]: the observation store port and its Postgres implementation
//! - [`ingest`]: the per-parcel pipeline and the dual-cadence scheduler
//!
//! Each signal (weather, NDVI) runs on its own cadence; one batch cycle
//! applies the pipeline to every monitored parcel, isolating failures per
//! parcel so a single bad fetch never aborts the batch.

pub mod database;
pub mod error;
pub mod ingest;
pub mod provider;
pub mod types;

pub use database::{ObservationStore, PostgresStore};
pub use error::IngestError;
pub use ingest::pipeline::IngestPipeline;
pub use ingest::scheduler::{CadenceSnapshot, Scheduler, SchedulerConfig};
pub use provider::{AgroApiProvider, AgroProvider};
pub use types::{NewObservation, Parcel, Signal, VegetationReading, WeatherReading};
