//! `qtally-count` — execution and count estimation for quantum counting.
//!
//! Drives the synthesis stages of `qtally-synth`, runs the resulting
//! phase-estimation circuit on any [`qtally_hal::Backend`] under a timeout,
//! and decodes the measured histogram into an estimate of how many dataset
//! states the decision tree marks.
//!
//! # Example
//!
//! ```ignore
//! use qtally_adapter_sim::SimulatorBackend;
//! use qtally_count::{CountingPipeline, PipelineConfig};
//!
//! let backend = SimulatorBackend::new().with_seed(7);
//! let pipeline = CountingPipeline::new(PipelineConfig::default())?;
//! let outcome = pipeline.run(&backend, &tree, &feature_names, &dataset).await?;
//! println!("≈ {:.2} marked states", outcome.estimate.estimated_count);
//! ```

pub mod config;
pub mod error;
pub mod estimate;
pub mod pipeline;
pub mod run;

pub use config::PipelineConfig;
pub use error::{CountError, CountResult};
pub use estimate::{CountEstimate, estimate_count, estimate_count_with_offset};
pub use pipeline::{CountingOutcome, CountingPipeline, PreparedCounting};
pub use run::run;
