use serde::{Deserialize, Serialize};

use crate::gate::LocationSample;

/// Body of `POST /api/location`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    pub vehicle_id: String,
    pub lat: f64,
    pub lon: f64,
    pub speed: f32,
    // No sensor feeds this; collectors expect the field anyway.
    pub fuel: f64,
}

impl LocationReport {
    pub fn from_sample(vehicle_id: &str, sample: &LocationSample) -> Self {
        Self {
            vehicle_id: vehicle_id.to_string(),
            lat: sample.latitude,
            lon: sample.longitude,
            speed: sample.speed_mps,
            fuel: 0.0,
        }
    }
}
