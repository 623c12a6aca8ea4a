//! HAL error type.

use thiserror::Error;

/// Failures reported by a [`Backend`](crate::Backend).
///
/// Callers pass these through unchanged; none are retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// The backend refused the submission.
    #[error("submission rejected: {0}")]
    SubmissionFailed(String),

    /// The job ran and failed.
    #[error("job failed: {0}")]
    JobFailed(String),

    /// The job was cancelled before completing.
    #[error("job cancelled")]
    JobCancelled,

    /// No job with this id is known.
    #[error("unknown job {0}")]
    JobNotFound(String),

    /// A result was requested before the job finished.
    #[error("job {job_id} has no result yet ({status})")]
    ResultNotReady {
        /// The job.
        job_id: String,
        /// Its current status.
        status: String,
    },

    /// The circuit uses something the backend cannot execute.
    #[error("invalid circuit: {0}")]
    InvalidCircuit(String),

    /// The circuit is wider than the backend.
    #[error("circuit needs {required} qubits, backend has {available}")]
    CircuitTooLarge {
        /// Qubits in the circuit.
        required: usize,
        /// Qubits on the backend.
        available: u32,
    },

    /// Shot count outside `1..=max_shots`.
    #[error("shots must be between 1 and {max}, got {got}")]
    InvalidShots {
        /// Requested shots.
        got: u32,
        /// Backend limit.
        max: u32,
    },

    /// A backend setting has the wrong type or range.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
