mod error;
mod tracker;
mod types;

pub use error::TrackerError;
pub use tracker::{Tracker, TrackerSettings};
pub use types::{TrackerCounters, TrackerMode, TrackerStatus};
