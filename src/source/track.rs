use serde::Deserialize;
use std::path::Path;

use super::error::SourceError;
use crate::gate::LocationSample;

/// A recorded sequence of samples, in the order they were produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub samples: Vec<LocationSample>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TrackFile {
    Bare(Vec<LocationSample>),
    Wrapped { samples: Vec<LocationSample> },
}

impl Track {
    /// Loads a YAML or JSON track, either a bare list of samples or a
    /// mapping with a `samples` key.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<Self, SourceError> {
        let samples = match serde_yaml::from_str(content)? {
            TrackFile::Bare(samples) => samples,
            TrackFile::Wrapped { samples } => samples,
        };
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
