//! Execution boundary for qtally circuits.
//!
//! A [`Backend`] takes a finished circuit and a shot count and hands back a
//! [`Counts`] histogram keyed by classical-register bitstring. Submission is
//! asynchronous: `submit` queues a [`Job`], `status` tracks it and
//! `wait` polls until a result or failure. Callers that need a deadline wrap
//! `wait` in a timeout and cancel on expiry.
//!
//! ```ignore
//! use qtally_hal::Backend;
//! use qtally_adapter_sim::SimulatorBackend;
//!
//! let backend = SimulatorBackend::new().with_seed(7);
//! let job = backend.submit(&circuit, 2048).await?;
//! let result = backend.wait(&job).await?;
//! let (outcome, hits) = result.counts.most_frequent().unwrap();
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult};
pub use capability::Capabilities;
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
