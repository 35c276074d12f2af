use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::gate::{geodesic_distance_m, LocationSample};

fn default_min_update_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_min_update_distance_m() -> f64 {
    5.0
}

/// What a platform location provider does before samples ever reach the
/// gate: it only delivers an update once both the interval has passed and
/// the device has moved far enough.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceFilter {
    #[serde(
        default = "default_min_update_interval",
        with = "crate::config::humantime_serde"
    )]
    pub min_update_interval: Duration,
    #[serde(default = "default_min_update_distance_m")]
    pub min_update_distance_m: f64,
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self {
            min_update_interval: default_min_update_interval(),
            min_update_distance_m: default_min_update_distance_m(),
        }
    }
}

impl SourceFilter {
    /// Lets every sample through.
    pub fn passthrough() -> Self {
        Self {
            min_update_interval: Duration::ZERO,
            min_update_distance_m: 0.0,
        }
    }

    pub fn admits(&self, last_delivered: Option<&LocationSample>, sample: &LocationSample) -> bool {
        let Some(last) = last_delivered else {
            return true;
        };
        let interval_ms = i64::try_from(self.min_update_interval.as_millis()).unwrap_or(i64::MAX);
        let elapsed_ms = sample.timestamp_ms.saturating_sub(last.timestamp_ms);
        let distance_m =
            geodesic_distance_m(last.latitude, last.longitude, sample.latitude, sample.longitude);

        elapsed_ms >= interval_ms && distance_m >= self.min_update_distance_m
    }

    pub fn filter(&self, samples: &[LocationSample]) -> Vec<LocationSample> {
        let mut delivered: Vec<LocationSample> = Vec::with_capacity(samples.len());
        for sample in samples {
            if self.admits(delivered.last(), sample) {
                delivered.push(*sample);
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_both_interval_and_movement() {
        let filter = SourceFilter::default();
        let samples = [
            LocationSample::new(12.9345, 77.6112, 0.0, 0),
            // moved, too early
            LocationSample::new(12.9355, 77.6112, 0.0, 2_000),
            // late enough, not moved
            LocationSample::new(12.9345, 77.6112, 0.0, 6_000),
            // late enough, moved
            LocationSample::new(12.9346, 77.6112, 0.0, 11_000),
        ];
        let delivered = filter.filter(&samples);
        assert_eq!(delivered, vec![samples[0], samples[3]]);
    }

    #[test]
    fn passthrough_keeps_everything() {
        let samples = [
            LocationSample::new(1.0, 1.0, 0.0, 5),
            LocationSample::new(1.0, 1.0, 0.0, 5),
        ];
        assert_eq!(SourceFilter::passthrough().filter(&samples).len(), 2);
    }
}
