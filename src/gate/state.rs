use super::sample::LocationSample;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// What the gate remembers about the last forwarded sample.
///
/// Both coordinates live in one `Option`, so they are either both known or
/// both absent. A fresh state has `last_sent_timestamp_ms == 0` and no
/// position; a sample stamped 0 still counts as sent once accepted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GateState {
    last_sent_timestamp_ms: i64,
    last_sent_position: Option<Position>,
}

impl GateState {
    pub fn never_sent() -> Self {
        Self::default()
    }

    pub fn is_never_sent(&self) -> bool {
        self.last_sent_position.is_none()
    }

    pub fn last_sent_timestamp_ms(&self) -> i64 {
        self.last_sent_timestamp_ms
    }

    pub fn last_sent_position(&self) -> Option<Position> {
        self.last_sent_position
    }

    pub fn reset(&mut self) {
        *self = Self::never_sent();
    }

    pub(super) fn sent(sample: &LocationSample) -> Self {
        Self {
            last_sent_timestamp_ms: sample.timestamp_ms,
            last_sent_position: Some(Position {
                latitude: sample.latitude,
                longitude: sample.longitude,
            }),
        }
    }
}
