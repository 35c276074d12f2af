use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::distance::geodesic_distance_m;
use super::sample::LocationSample;
use super::state::GateState;

fn default_min_distance_m() -> f64 {
    10.0
}

fn default_max_interval() -> Duration {
    Duration::from_secs(15)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_min_distance_m")]
    pub min_distance_m: f64,
    #[serde(default = "default_max_interval", with = "crate::config::humantime_serde")]
    pub max_interval: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_distance_m: default_min_distance_m(),
            max_interval: default_max_interval(),
        }
    }
}

impl GateConfig {
    pub fn max_interval_ms(&self) -> i64 {
        i64::try_from(self.max_interval.as_millis()).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    FirstSample,
    Moved,
    IntervalElapsed,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub accept: bool,
    pub reason: DecisionReason,
    pub distance_m: Option<f64>,
    pub elapsed_ms: Option<i64>,
    pub state: GateState,
}

/// Runs the gate and reports why a sample was accepted or rejected.
///
/// A sample with non-finite coordinates is infinitely far from the last sent
/// one, so it always passes on distance.
pub fn evaluate(sample: &LocationSample, state: &GateState, config: &GateConfig) -> Decision {
    let last_position = match state.last_sent_position() {
        Some(position) => position,
        None => {
            return Decision {
                accept: true,
                reason: DecisionReason::FirstSample,
                distance_m: None,
                elapsed_ms: None,
                state: GateState::sent(sample),
            }
        }
    };

    let distance_m = geodesic_distance_m(
        last_position.latitude,
        last_position.longitude,
        sample.latitude,
        sample.longitude,
    );
    let elapsed_ms = sample
        .timestamp_ms
        .saturating_sub(state.last_sent_timestamp_ms());

    let reason = if distance_m >= config.min_distance_m {
        DecisionReason::Moved
    } else if elapsed_ms >= config.max_interval_ms() {
        DecisionReason::IntervalElapsed
    } else {
        DecisionReason::Rejected
    };
    let accept = reason != DecisionReason::Rejected;

    Decision {
        accept,
        reason,
        distance_m: Some(distance_m),
        elapsed_ms: Some(elapsed_ms),
        state: if accept {
            GateState::sent(sample)
        } else {
            *state
        },
    }
}

/// Decides whether `sample` should be forwarded, returning the state to keep
/// afterwards. Pure: the caller applies the new state and performs the send.
pub fn should_accept(
    sample: &LocationSample,
    state: &GateState,
    config: &GateConfig,
) -> (bool, GateState) {
    let decision = evaluate(sample, state, config);
    (decision.accept, decision.state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GateConfig {
        GateConfig {
            min_distance_m: 10.0,
            max_interval: Duration::from_millis(15_000),
        }
    }

    fn at(lat: f64, lon: f64, t: i64) -> LocationSample {
        LocationSample::new(lat, lon, 0.0, t)
    }

    #[test]
    fn first_sample_is_always_accepted() {
        let state = GateState::never_sent();
        for sample in [
            at(12.9345, 77.6112, 1_000),
            at(-89.9, 179.9, 42),
            at(0.0, 0.0, -5),
            at(500.0, -900.0, 7),
        ] {
            let (accept, new_state) = should_accept(&sample, &state, &config());
            assert!(accept);
            assert_eq!(new_state.last_sent_timestamp_ms(), sample.timestamp_ms);
        }
    }

    #[test]
    fn stationary_within_interval_is_rejected() {
        let (_, state) = should_accept(&at(12.9345, 77.6112, 1_000), &GateState::never_sent(), &config());
        let (accept, new_state) = should_accept(&at(12.9345, 77.6112, 15_999), &state, &config());
        assert!(!accept);
        assert_eq!(new_state, state);
    }

    #[test]
    fn stationary_after_interval_is_accepted() {
        let (_, state) = should_accept(&at(12.9345, 77.6112, 1_000), &GateState::never_sent(), &config());
        let decision = evaluate(&at(12.9345, 77.6112, 16_000), &state, &config());
        assert!(decision.accept);
        assert_eq!(decision.reason, DecisionReason::IntervalElapsed);
        assert_eq!(decision.elapsed_ms, Some(15_000));
    }

    #[test]
    fn movement_within_interval_is_accepted() {
        let (_, state) = should_accept(&at(12.9345, 77.6112, 1_000), &GateState::never_sent(), &config());
        let decision = evaluate(&at(12.9347, 77.6112, 2_000), &state, &config());
        assert!(decision.accept);
        assert_eq!(decision.reason, DecisionReason::Moved);
    }

    #[test]
    fn rejection_is_idempotent() {
        let (_, state) = should_accept(&at(12.9345, 77.6112, 1_000), &GateState::never_sent(), &config());
        let sample = at(12.93451, 77.6112, 3_000);
        let first = should_accept(&sample, &state, &config());
        let second = should_accept(&sample, &first.1, &config());
        assert_eq!(first, (false, state));
        assert_eq!(second, first);
    }

    #[test]
    fn acceptance_copies_sample_exactly() {
        let (_, state) = should_accept(&at(1.0, 2.0, 1_000), &GateState::never_sent(), &config());
        let sample = at(1.123_456_789, 2.987_654_321, 99_999);
        let (accept, new_state) = should_accept(&sample, &state, &config());
        assert!(accept);
        assert_eq!(new_state.last_sent_timestamp_ms(), 99_999);
        let position = new_state.last_sent_position().unwrap();
        assert_eq!(position.latitude, 1.123_456_789);
        assert_eq!(position.longitude, 2.987_654_321);
    }

    #[test]
    fn out_of_order_sample_needs_movement() {
        let (_, state) = should_accept(&at(12.9345, 77.6112, 20_000), &GateState::never_sent(), &config());

        let stale = evaluate(&at(12.9345, 77.6112, 5_000), &state, &config());
        assert!(!stale.accept);
        assert_eq!(stale.elapsed_ms, Some(-15_000));

        let moved = evaluate(&at(12.9355, 77.6112, 5_000), &state, &config());
        assert!(moved.accept);
        assert_eq!(moved.state.last_sent_timestamp_ms(), 5_000);
    }

    #[test]
    fn zero_thresholds_always_accept() {
        let config = GateConfig {
            min_distance_m: 0.0,
            max_interval: Duration::ZERO,
        };
        let (_, state) = should_accept(&at(1.0, 1.0, 1_000), &GateState::never_sent(), &config);
        let (accept, _) = should_accept(&at(1.0, 1.0, 1_000), &state, &config);
        assert!(accept);
    }

    #[test]
    fn non_finite_coordinates_count_as_moved() {
        let (_, state) = should_accept(&at(1.0, 1.0, 1_000), &GateState::never_sent(), &config());
        let decision = evaluate(&at(f64::NAN, 1.0, 2_000), &state, &config());
        assert!(decision.accept);
        assert_eq!(decision.reason, DecisionReason::Moved);
        assert_eq!(decision.distance_m, Some(f64::INFINITY));
    }

    #[test]
    fn non_finite_coordinates_pass_a_zero_distance_threshold() {
        let config = GateConfig {
            min_distance_m: 0.0,
            max_interval: Duration::from_secs(3_600),
        };
        let (_, state) = should_accept(&at(1.0, 1.0, 1_000), &GateState::never_sent(), &config);
        let (accept, _) = should_accept(&at(1.0, f64::NAN, 1_500), &state, &config);
        assert!(accept);
    }

    #[test]
    fn reset_returns_to_never_sent() {
        let (_, mut state) = should_accept(&at(1.0, 1.0, 1_000), &GateState::never_sent(), &config());
        assert!(!state.is_never_sent());
        state.reset();
        assert!(state.is_never_sent());
        assert_eq!(state.last_sent_position(), None);
    }

    #[test]
    fn commute_scenario() {
        let config = config();
        let mut state = GateState::never_sent();
        let expected = [
            (at(12.9345, 77.6112, 0), true),
            (at(12.9345, 77.6112, 5_000), false),
            (at(12.9345, 77.6112, 16_000), true),
            (at(12.9355, 77.6112, 16_500), true),
        ];

        for (i, (sample, want)) in expected.iter().enumerate() {
            let (accept, next) = should_accept(sample, &state, &config);
            assert_eq!(accept, *want, "sample {i}");
            state = next;
        }
        assert_eq!(state.last_sent_timestamp_ms(), 16_500);
    }
}
