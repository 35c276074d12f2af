use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::gate::GateConfig;
use crate::source::SourceFilter;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub source: SourceFilter,
    #[serde(default)]
    pub web: WebConfig,
}

/// Where accepted samples are reported and under which vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    pub base_url: String,
    #[serde(default = "default_vehicle_id")]
    pub vehicle_id: String,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

fn default_vehicle_id() -> String {
    "ANDROID01".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tracker.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("tracker.base_url is empty".into()));
        }
        if self.tracker.request_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "tracker.request_timeout must be positive".into(),
            ));
        }
        if self.tracker.vehicle_id.is_empty() {
            return Err(ConfigError::Invalid("tracker.vehicle_id is empty".into()));
        }
        if !(self.gate.min_distance_m >= 0.0) {
            return Err(ConfigError::Invalid(
                "gate.min_distance_m must be non-negative".into(),
            ));
        }
        if !(self.source.min_update_distance_m >= 0.0) {
            return Err(ConfigError::Invalid(
                "source.min_update_distance_m must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// Serde adapter for durations written as "15s", "500ms", "1m 30s".
pub mod humantime_serde {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
    }

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&humantime::format_duration(*duration))
    }
}
