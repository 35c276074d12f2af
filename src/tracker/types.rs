use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::gate::LocationSample;

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub enum TrackerMode {
    Idle,
    Running {
        session_id: Uuid,
        started_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct TrackerCounters {
    pub received: u64,
    pub accepted: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TrackerStatus {
    pub mode: TrackerMode,
    pub last_sample: Option<LocationSample>,
    pub last_accepted: Option<LocationSample>,
    pub counters: TrackerCounters,
}

impl TrackerStatus {
    pub fn idle() -> Self {
        Self {
            mode: TrackerMode::Idle,
            last_sample: None,
            last_accepted: None,
            counters: TrackerCounters::default(),
        }
    }
}
