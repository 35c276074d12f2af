use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker already running")]
    AlreadyRunning,
    #[error("tracker is not running")]
    NotRunning,
}
