//! Scheduled ingestion: the per-parcel fetch/transform/persist pipeline and
//! the dual-cadence scheduler that drives it.

pub mod pipeline;
pub mod scheduler;
