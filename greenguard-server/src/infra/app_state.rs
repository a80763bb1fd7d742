use crate::infra::config::Config;
use greenguard_core::{CadenceSnapshot, IngestPipeline};
use std::{fmt, sync::Arc};
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IngestPipeline>,
    /// Read-only cadence view published by the scheduler; the control
    /// surface never mutates schedule state.
    pub cadences: watch::Receiver<CadenceSnapshot>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
