use std::time::Duration;

use super::error::SourceError;
use super::filter::SourceFilter;
use super::track::Track;
use crate::tracker::Tracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Push samples back to back.
    Immediate,
    /// Sleep for the recorded gap between consecutive samples.
    Realtime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub delivered: usize,
    pub filtered: usize,
}

/// Feeds a recorded track into a running tracker, applying the source-level
/// filter first.
pub async fn replay(
    track: &Track,
    filter: &SourceFilter,
    tracker: &Tracker,
    pace: Pace,
) -> Result<ReplaySummary, SourceError> {
    let delivered = filter.filter(&track.samples);
    let summary = ReplaySummary {
        delivered: delivered.len(),
        filtered: track.len() - delivered.len(),
    };
    log::info!(
        "Replaying {} samples ({} dropped by source filter)",
        summary.delivered,
        summary.filtered
    );

    let mut previous_ms = None;
    for sample in delivered {
        if pace == Pace::Realtime {
            if let Some(previous_ms) = previous_ms {
                let gap_ms = sample.timestamp_ms.saturating_sub(previous_ms).max(0);
                tokio::time::sleep(Duration::from_millis(gap_ms as u64)).await;
            }
            previous_ms = Some(sample.timestamp_ms);
        }
        tracker.push(sample).await?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{GateConfig, LocationSample};
    use crate::sink::RecordingSink;
    use crate::tracker::{TrackerError, TrackerSettings};
    use std::sync::Arc;

    fn scenario() -> Track {
        Track {
            samples: vec![
                LocationSample::new(12.9345, 77.6112, 0.0, 0),
                LocationSample::new(12.9345, 77.6112, 0.0, 5_000),
                LocationSample::new(12.9345, 77.6112, 0.0, 16_000),
                LocationSample::new(12.9355, 77.6112, 0.0, 16_500),
            ],
        }
    }

    fn tracker(sink: &RecordingSink) -> Tracker {
        Tracker::new(
            TrackerSettings {
                vehicle_id: "ANDROID01".into(),
                gate: GateConfig::default(),
            },
            Arc::new(sink.clone()),
        )
    }

    #[tokio::test]
    async fn replays_through_gate() {
        let sink = RecordingSink::new();
        let mut tracker = tracker(&sink);
        tracker.start().unwrap();

        let summary = replay(&scenario(), &SourceFilter::passthrough(), &tracker, Pace::Immediate)
            .await
            .unwrap();
        tracker.stop().await;

        assert_eq!(summary, ReplaySummary { delivered: 4, filtered: 0 });
        let sent: Vec<f64> = sink.reports().iter().map(|r| r.lat).collect();
        assert_eq!(sent, vec![12.9345, 12.9345, 12.9355]);
    }

    #[tokio::test(start_paused = true)]
    async fn realtime_pace_keeps_recorded_gaps() {
        let sink = RecordingSink::new();
        let mut tracker = tracker(&sink);
        tracker.start().unwrap();

        let started = tokio::time::Instant::now();
        replay(&scenario(), &SourceFilter::passthrough(), &tracker, Pace::Realtime)
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(16_500));
        tracker.stop().await;
        assert_eq!(sink.reports().len(), 3);
    }

    #[tokio::test]
    async fn replay_requires_running_tracker() {
        let sink = RecordingSink::new();
        let tracker = tracker(&sink);
        let result = replay(&scenario(), &SourceFilter::default(), &tracker, Pace::Immediate).await;
        assert!(matches!(result, Err(SourceError::Tracker(TrackerError::NotRunning))));
    }
}
