//! Dual-cadence scheduler.
//!
//! One background loop owns the per-signal cadence state. A fast fixed tick
//! evaluates each signal independently; a due signal runs a full batch cycle
//! and its `last_run` advances to the cycle start regardless of per-parcel
//! outcomes, so a partial failure waits a full interval rather than retry
//! storming. Cadence state lives for the process lifetime and starts as
//! "never run", which makes the first cycle immediate.
//!
//! Manually triggered cycles (control surface) run as independent tasks and
//! never touch the cadence state, so a manual trigger neither delays nor
//! advances the next scheduled cycle. Nothing guards a scheduled and a
//! manually triggered cycle for the same signal against overlapping; each
//! observation append is its own transaction, so overlapping cycles can at
//! worst duplicate rows within a short window.

use crate::ingest::pipeline::IngestPipeline;
use crate::types::Signal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

/// Cadence intervals and the due-check tick.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub weather_interval: Duration,
    pub ndvi_interval: Duration,
    pub tick: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            weather_interval: Duration::from_secs(3_600),
            ndvi_interval: Duration::from_secs(5 * 86_400),
            tick: Duration::from_secs(60),
        }
    }
}

/// Read-only view of the cadence state, published to the control surface
/// instead of sharing the scheduler's mutable fields.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CadenceSnapshot {
    pub last_weather_run: Option<DateTime<Utc>>,
    pub last_ndvi_run: Option<DateTime<Utc>>,
}

/// Owns the cadence state and drives the pipeline. Consumed by [`Scheduler::run`],
/// which loops for the process lifetime.
pub struct Scheduler {
    pipeline: Arc<IngestPipeline>,
    config: SchedulerConfig,
    last_weather: Option<Instant>,
    last_ndvi: Option<Instant>,
    snapshot: watch::Sender<CadenceSnapshot>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn is_due(now: Instant, last_run: Option<Instant>, interval: Duration) -> bool {
    match last_run {
        None => true,
        Some(last) => now.duration_since(last) >= interval,
    }
}

impl Scheduler {
    pub fn new(
        pipeline: Arc<IngestPipeline>,
        config: SchedulerConfig,
    ) -> (Self, watch::Receiver<CadenceSnapshot>) {
        let (snapshot, rx) = watch::channel(CadenceSnapshot::default());
        (
            Self {
                pipeline,
                config,
                last_weather: None,
                last_ndvi: None,
                snapshot,
            },
            rx,
        )
    }

    /// Run the scheduling loop. On start, one full cycle of both signals runs
    /// immediately, bypassing the due-check; after that each tick evaluates
    /// the signals independently. Cycles run to completion on this loop with
    /// no mid-cycle cancellation, and nothing a cycle does can terminate it.
    pub async fn run(mut self) {
        info!(
            weather_interval_secs = self.config.weather_interval.as_secs(),
            ndvi_interval_secs = self.config.ndvi_interval.as_secs(),
            "scheduler started, running initial fetch"
        );

        self.run_signal(Signal::Weather).await;
        self.run_signal(Signal::Ndvi).await;

        let mut ticker = tokio::time::interval(self.config.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if is_due(Instant::now(), self.last_weather, self.config.weather_interval) {
                self.run_signal(Signal::Weather).await;
            }

            // Re-read the clock so a slow weather batch does not skew the
            // vegetation due-check.
            if is_due(Instant::now(), self.last_ndvi, self.config.ndvi_interval) {
                self.run_signal(Signal::Ndvi).await;
            }
        }
    }

    async fn run_signal(&mut self, signal: Signal) {
        let started = Instant::now();
        let started_wall = Utc::now();

        self.pipeline.run_cycle(signal).await;

        match signal {
            Signal::Weather => self.last_weather = Some(started),
            Signal::Ndvi => self.last_ndvi = Some(started),
        }
        self.snapshot.send_modify(|snap| match signal {
            Signal::Weather => snap.last_weather_run = Some(started_wall),
            Signal::Ndvi => snap.last_ndvi_run = Some(started_wall),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ObservationStore;
    use crate::error::Result;
    use crate::provider::AgroProvider;
    use crate::types::{NewObservation, Parcel, VegetationReading, WeatherReading};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[tokio::test(start_paused = true)]
    async fn due_check_respects_the_interval_boundary() {
        let interval = Duration::from_secs(3_600);
        let last = Instant::now();

        assert!(is_due(last, None, interval), "never-run is always due");
        assert!(
            !is_due(last + interval - Duration::from_secs(1), Some(last), interval),
            "one second early must not run"
        );
        assert!(
            is_due(last + interval, Some(last), interval),
            "exactly one interval later must run"
        );
    }

    struct CountingProvider;

    #[async_trait]
    impl AgroProvider for CountingProvider {
        async fn fetch_current_weather(&self, _polygon_id: &str) -> Result<WeatherReading> {
            Ok(WeatherReading {
                payload: json!({ "main": { "temp": 22.0, "humidity": 50 } }),
            })
        }

        async fn fetch_latest_ndvi(
            &self,
            _polygon_id: &str,
        ) -> Result<Option<VegetationReading>> {
            Ok(Some(VegetationReading {
                dt: None,
                mean: Some(0.4),
            }))
        }
    }

    #[derive(Default)]
    struct CountingStore {
        appended: Mutex<Vec<NewObservation>>,
    }

    impl CountingStore {
        fn weather_writes(&self) -> usize {
            self.appended
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.weather.is_some())
                .count()
        }

        fn ndvi_writes(&self) -> usize {
            self.appended
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.ndvi.is_some())
                .count()
        }
    }

    #[async_trait]
    impl ObservationStore for CountingStore {
        async fn list_monitored_parcels(&self) -> Result<Vec<Parcel>> {
            Ok(vec![Parcel {
                id: "farm-1".into(),
                name: "North Field".into(),
                polygon_id: Some("poly-1".into()),
            }])
        }

        async fn append_observation(
            &self,
            _parcel_id: &str,
            observation: NewObservation,
        ) -> Result<()> {
            self.appended.lock().unwrap().push(observation);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn initial_cycle_runs_immediately_and_cadences_advance_independently() {
        let store = Arc::new(CountingStore::default());
        let pipeline = Arc::new(IngestPipeline::new(
            Arc::new(CountingProvider),
            store.clone(),
        ));
        let config = SchedulerConfig {
            weather_interval: Duration::from_secs(100),
            ndvi_interval: Duration::from_secs(1_000),
            tick: Duration::from_secs(10),
        };
        let (scheduler, snapshot) = Scheduler::new(pipeline, config);
        tokio::spawn(scheduler.run());

        // both signals run once on start, bypassing the due-check
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(store.weather_writes(), 1);
        assert_eq!(store.ndvi_writes(), 1);
        assert!(snapshot.borrow().last_weather_run.is_some());
        assert!(snapshot.borrow().last_ndvi_run.is_some());

        // just short of the weather interval: nothing new
        tokio::time::sleep(Duration::from_secs(89)).await;
        assert_eq!(store.weather_writes(), 1);

        // past the weather interval, still well short of the ndvi one
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(store.weather_writes(), 2);
        assert_eq!(store.ndvi_writes(), 1);
    }
}
