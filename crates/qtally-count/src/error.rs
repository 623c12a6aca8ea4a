//! Error types for the counting pipeline.

use std::time::Duration;

use thiserror::Error;

use qtally_hal::HalError;
use qtally_synth::SynthError;

/// Errors produced while running or decoding a counting job.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CountError {
    /// Circuit synthesis failed.
    #[error(transparent)]
    Synth(#[from] SynthError),

    /// The backend reported an error; passed through unchanged.
    #[error("Execution failed: {0}")]
    Execution(#[from] HalError),

    /// The job did not finish in time and was cancelled.
    #[error("Job {job_id} did not finish within {timeout:?}")]
    Timeout {
        /// The abandoned job.
        job_id: String,
        /// The limit that elapsed.
        timeout: Duration,
    },

    /// The histogram contains no outcomes.
    #[error("Measurement histogram is empty")]
    EmptyHistogram,

    /// A histogram key is not a bitstring of the expected width.
    #[error("Invalid outcome '{outcome}': expected {width} binary digits")]
    InvalidOutcome {
        /// The offending key.
        outcome: String,
        /// Expected number of digits.
        width: u32,
    },

    /// Pipeline configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for counting operations.
pub type CountResult<T> = Result<T, CountError>;
