//! Pipeline configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use qtally_synth::MAX_PRECISION;

use crate::error::{CountError, CountResult};

/// Settings for one counting run.
///
/// Every field has a default, so partial YAML or JSON documents are valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Dataset columns to encode; `None` encodes every named feature.
    pub feature_indices: Option<Vec<usize>>,
    /// Class whose leaves form the oracle.
    pub positive_class_index: usize,
    /// Width of the phase-estimation register.
    pub precision_width: u32,
    /// Number of measurement shots.
    pub shots: u32,
    /// Execution timeout in seconds.
    pub timeout_secs: u64,
    /// Simulator sampling seed.
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            feature_indices: None,
            positive_class_index: 1,
            precision_width: 3,
            shots: 4096,
            timeout_secs: 300,
            seed: None,
        }
    }
}

impl PipelineConfig {
    /// Check value ranges.
    pub fn validate(&self) -> CountResult<()> {
        if self.shots == 0 {
            return Err(CountError::InvalidConfig("shots must be positive".into()));
        }
        if self.precision_width == 0 || self.precision_width > MAX_PRECISION {
            return Err(CountError::InvalidConfig(format!(
                "precision_width must be between 1 and {MAX_PRECISION}, got {}",
                self.precision_width
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CountError::InvalidConfig(
                "timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// The execution timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Set the precision width.
    #[must_use]
    pub fn with_precision_width(mut self, precision_width: u32) -> Self {
        self.precision_width = precision_width;
        self
    }

    /// Set the number of shots.
    #[must_use]
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Set the sampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Restrict encoding to the given dataset columns.
    #[must_use]
    pub fn with_feature_indices(mut self, indices: Vec<usize>) -> Self {
        self.feature_indices = Some(indices);
        self
    }
}
