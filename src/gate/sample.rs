use serde::{Deserialize, Serialize};

/// One raw reading from a location source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub speed_mps: f32,
    pub timestamp_ms: i64,
}

impl LocationSample {
    pub fn new(latitude: f64, longitude: f64, speed_mps: f32, timestamp_ms: i64) -> Self {
        Self {
            latitude,
            longitude,
            speed_mps,
            timestamp_ms,
        }
    }
}
