//! The execution boundary: where a finished circuit goes to be sampled.
//!
//! A counting run touches the job lifecycle once:
//!
//! ```text
//!   submit() ──→ status()* ──→ result()
//!        └──── wait() ────────────┘
//! ```
//!
//! `wait()` is provided and polls without a deadline. Deadlines belong to
//! the caller, which cancels the job when one expires.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use qtally_ir::Circuit;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Backend selection plus free-form settings, read from YAML or JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    pub name: String,
    /// Backend-specific settings such as `max_qubits` or `seed`.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Create a configuration with no extras.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Add an extra setting.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Read an unsigned integer setting.
    ///
    /// Missing keys and `null` give `Ok(None)`; any other non-integer is a
    /// configuration error.
    pub fn extra_u64(&self, key: &str) -> HalResult<Option<u64>> {
        match self.extra.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(v) => v.as_u64().map(Some).ok_or_else(|| {
                HalError::Configuration(format!(
                    "'{key}' must be a non-negative integer, got {v}"
                ))
            }),
        }
    }
}

/// Whether a backend is taking jobs right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendAvailability {
    /// Jobs can be submitted.
    Ready,
    /// Submissions would be refused.
    Offline {
        /// Why, as reported by the backend.
        reason: String,
    },
}

impl BackendAvailability {
    pub fn is_ready(&self) -> bool {
        matches!(self, BackendAvailability::Ready)
    }
}

/// Outcome of checking a circuit against backend constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// The circuit can be submitted as is.
    Valid,
    /// The circuit would be rejected.
    Invalid {
        /// Every violated constraint.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    /// Check if the circuit is valid.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// A place to run circuits and collect measurement histograms.
///
/// `capabilities()` is synchronous and cached at construction. `submit()`
/// returns a queued job; `result()` succeeds only once `status()` reports
/// `Completed`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Configured backend name.
    fn name(&self) -> &str;

    /// Limits checked before a circuit is built for this backend.
    fn capabilities(&self) -> &Capabilities;

    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Check a circuit against backend constraints without submitting it.
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Queue `circuit` for `shots` samples.
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId>;

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// The histogram of a completed job; `ResultNotReady` before that.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Stop a job. Finished jobs are left as they are.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Delay between status polls in [`Backend::wait`].
    fn poll_interval(&self) -> Duration {
        Duration::from_millis(500)
    }

    /// Poll until the job reaches a terminal state and return its result.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        loop {
            let status = self.status(job_id).await?;
            match status {
                JobStatus::Completed => break,
                JobStatus::Failed(reason) => return Err(HalError::JobFailed(reason)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    tracing::trace!(%job_id, %status, "waiting");
                    tokio::time::sleep(self.poll_interval()).await;
                }
            }
        }
        self.result(job_id).await
    }
}

/// Backends that can be built from a [`BackendConfig`].
pub trait BackendFactory: Backend + Sized {
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}
