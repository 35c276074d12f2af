use thiserror::Error;

use crate::tracker::TrackerError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("track file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("invalid track file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),
}
