mod http;
mod payload;

use std::sync::{Arc, Mutex};

pub use http::{HttpSink, SinkError, SinkStats};
pub use payload::LocationReport;

/// Something that delivers accepted samples. Implementations must return
/// without waiting for delivery.
pub trait TransportSink: Send + Sync {
    fn send(&self, report: LocationReport);
}

/// Keeps every report in memory instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    reports: Arc<Mutex<Vec<LocationReport>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<LocationReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl TransportSink for RecordingSink {
    fn send(&self, report: LocationReport) {
        log::debug!(
            "Recording report for {}: {}, {}",
            report.vehicle_id,
            report.lat,
            report.lon
        );
        self.reports.lock().unwrap().push(report);
    }
}
