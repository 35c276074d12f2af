use chrono::Utc;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::error::TrackerError;
use super::types::{TrackerMode, TrackerStatus};
use crate::gate::{self, GateConfig, GateState, LocationSample};
use crate::sink::{LocationReport, TransportSink};

const SAMPLE_QUEUE: usize = 64;

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub vehicle_id: String,
    pub gate: GateConfig,
}

#[derive(Debug)]
struct Shared {
    status: TrackerStatus,
}

#[derive(Debug)]
struct WorkerHandle {
    samples_tx: mpsc::Sender<LocationSample>,
    join: JoinHandle<()>,
}

/// One tracking session at a time. The worker task is the only owner of the
/// gate state; samples reach it through a channel in arrival order.
pub struct Tracker {
    settings: TrackerSettings,
    sink: Arc<dyn TransportSink>,
    shared: Arc<StdMutex<Shared>>,
    worker: Option<WorkerHandle>,
}

impl Tracker {
    pub fn new(settings: TrackerSettings, sink: Arc<dyn TransportSink>) -> Self {
        Self {
            settings,
            sink,
            shared: Arc::new(StdMutex::new(Shared {
                status: TrackerStatus::idle(),
            })),
            worker: None,
        }
    }

    pub fn status(&self) -> TrackerStatus {
        self.shared.lock().unwrap().status.clone()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn start(&mut self) -> Result<TrackerMode, TrackerError> {
        if self.worker.is_some() {
            return Err(TrackerError::AlreadyRunning);
        }

        let mode = TrackerMode::Running {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
        };
        {
            let mut locked = self.shared.lock().unwrap();
            locked.status = TrackerStatus::idle();
            locked.status.mode = mode.clone();
        }

        let (samples_tx, samples_rx) = mpsc::channel(SAMPLE_QUEUE);
        let shared = self.shared.clone();
        let settings = self.settings.clone();
        let sink = self.sink.clone();
        let join = tokio::spawn(run_gate_loop(shared, settings, sink, samples_rx));

        self.worker = Some(WorkerHandle { samples_tx, join });
        log::info!("Tracking started for {}", self.settings.vehicle_id);

        Ok(mode)
    }

    /// Closes the session. Samples already queued are still processed.
    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            drop(worker.samples_tx);
            if let Err(e) = worker.join.await {
                log::error!("Tracking worker failed: {}", e);
            }
            log::info!("Tracking stopped for {}", self.settings.vehicle_id);
        }
        let mut locked = self.shared.lock().unwrap();
        locked.status.mode = TrackerMode::Idle;
    }

    /// A handle for feeding samples without holding on to the tracker, e.g.
    /// while the queue is full.
    pub fn sender(&self) -> Result<mpsc::Sender<LocationSample>, TrackerError> {
        self.worker
            .as_ref()
            .map(|w| w.samples_tx.clone())
            .ok_or(TrackerError::NotRunning)
    }

    pub async fn push(&self, sample: LocationSample) -> Result<(), TrackerError> {
        let worker = self.worker.as_ref().ok_or(TrackerError::NotRunning)?;
        worker
            .samples_tx
            .send(sample)
            .await
            .map_err(|_| TrackerError::NotRunning)
    }
}

async fn run_gate_loop(
    shared: Arc<StdMutex<Shared>>,
    settings: TrackerSettings,
    sink: Arc<dyn TransportSink>,
    mut samples_rx: mpsc::Receiver<LocationSample>,
) {
    // Fresh for every session.
    let mut state = GateState::never_sent();

    while let Some(sample) = samples_rx.recv().await {
        process_sample(&shared, &settings, sink.as_ref(), &mut state, sample);
    }
}

fn process_sample(
    shared: &StdMutex<Shared>,
    settings: &TrackerSettings,
    sink: &dyn TransportSink,
    state: &mut GateState,
    sample: LocationSample,
) {
    log::debug!(
        "Got location: {}, {}, speed={}",
        sample.latitude,
        sample.longitude,
        sample.speed_mps
    );

    let decision = gate::evaluate(&sample, state, &settings.gate);

    {
        let mut locked = shared.lock().unwrap();
        let status = &mut locked.status;
        status.counters.received += 1;
        status.last_sample = Some(sample);
        if decision.accept {
            status.counters.accepted += 1;
            status.last_accepted = Some(sample);
        } else {
            status.counters.rejected += 1;
        }
    }

    if !decision.accept {
        log::debug!(
            "Skipping send: distance={:.1} m, timeSinceLast={} ms",
            decision.distance_m.unwrap_or_default(),
            decision.elapsed_ms.unwrap_or_default()
        );
        return;
    }

    // Advances on acceptance, whether or not the send later succeeds.
    *state = decision.state;
    log::debug!("Forwarding sample ({:?})", decision.reason);
    sink.send(LocationReport::from_sample(&settings.vehicle_id, &sample));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use std::time::Duration;

    fn tracker(sink: &RecordingSink) -> Tracker {
        Tracker::new(
            TrackerSettings {
                vehicle_id: "ANDROID01".into(),
                gate: GateConfig {
                    min_distance_m: 10.0,
                    max_interval: Duration::from_secs(15),
                },
            },
            Arc::new(sink.clone()),
        )
    }

    #[tokio::test]
    async fn forwards_only_accepted_samples() {
        let sink = RecordingSink::new();
        let mut tracker = tracker(&sink);
        tracker.start().unwrap();

        for sample in [
            LocationSample::new(12.9345, 77.6112, 1.5, 1_000),
            LocationSample::new(12.9345, 77.6112, 0.0, 6_000),
            LocationSample::new(12.9345, 77.6112, 0.0, 17_000),
            LocationSample::new(12.9355, 77.6112, 8.25, 17_500),
        ] {
            tracker.push(sample).await.unwrap();
        }
        tracker.stop().await;

        let reports = sink.reports();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].speed, 1.5);
        assert_eq!(reports[2].lat, 12.9355);
        assert_eq!(reports[2].speed, 8.25);
        assert!(reports
            .iter()
            .all(|r| r.vehicle_id == "ANDROID01" && r.fuel == 0.0));

        let status = tracker.status();
        assert_eq!(status.mode, TrackerMode::Idle);
        assert_eq!(status.counters.received, 4);
        assert_eq!(status.counters.accepted, 3);
        assert_eq!(status.counters.rejected, 1);
        assert_eq!(status.last_accepted.map(|s| s.timestamp_ms), Some(17_500));
    }

    #[tokio::test]
    async fn restart_resets_the_gate() {
        let sink = RecordingSink::new();
        let mut tracker = tracker(&sink);
        let sample = LocationSample::new(48.1, 11.5, 0.0, 1_000);

        tracker.start().unwrap();
        tracker.push(sample).await.unwrap();
        tracker.push(sample).await.unwrap();
        tracker.stop().await;
        assert_eq!(sink.reports().len(), 1);

        tracker.start().unwrap();
        assert_eq!(tracker.status().counters.received, 0);
        tracker.push(sample).await.unwrap();
        tracker.stop().await;
        assert_eq!(sink.reports().len(), 2);
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let sink = RecordingSink::new();
        let mut tracker = tracker(&sink);
        tracker.start().unwrap();
        assert!(matches!(tracker.start(), Err(TrackerError::AlreadyRunning)));
        tracker.stop().await;
        assert!(!tracker.is_running());
    }

    #[tokio::test]
    async fn sender_outlives_the_borrow() {
        let sink = RecordingSink::new();
        let mut tracker = tracker(&sink);
        assert!(matches!(tracker.sender(), Err(TrackerError::NotRunning)));

        tracker.start().unwrap();
        let samples_tx = tracker.sender().unwrap();
        samples_tx
            .send(LocationSample::new(48.1, 11.5, 0.0, 1_000))
            .await
            .unwrap();
        drop(samples_tx);
        tracker.stop().await;

        assert_eq!(sink.reports().len(), 1);
        assert!(matches!(tracker.sender(), Err(TrackerError::NotRunning)));
    }

    #[tokio::test]
    async fn push_while_idle_is_rejected() {
        let sink = RecordingSink::new();
        let tracker = tracker(&sink);
        let result = tracker.push(LocationSample::new(0.0, 0.0, 0.0, 1)).await;
        assert!(matches!(result, Err(TrackerError::NotRunning)));
        assert!(sink.reports().is_empty());
    }
}
