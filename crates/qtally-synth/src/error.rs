//! Error types for the synth crate.

use thiserror::Error;

/// Errors produced while synthesizing counting circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SynthError {
    /// The decision tree is malformed.
    #[error("Invalid decision tree: {0}")]
    InvalidTree(String),

    /// A feature name does not follow the `<prefix>_<integer>` pattern.
    #[error("Invalid feature name '{name}': {reason}")]
    InvalidFeatureName {
        /// The offending name.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Too many features for a dense amplitude vector.
    #[error("{requested} features requested but at most {max} are supported")]
    TooManyFeatures {
        /// Number of features requested.
        requested: usize,
        /// The supported maximum.
        max: usize,
    },

    /// A sample is shorter than the selected feature indices require.
    #[error("Sample {sample} has {len} values but feature selection needs {required}")]
    Dimension {
        /// Index of the sample in the dataset.
        sample: usize,
        /// Length of the sample.
        len: usize,
        /// Minimum required length.
        required: usize,
    },

    /// Oracle and state preparation disagree on the number of qubits.
    #[error(
        "Oracle has {oracle} qubits but state preparation has {state_prep}; expected oracle = state preparation + 1"
    )]
    WidthMismatch {
        /// Oracle (or iterate) width.
        oracle: usize,
        /// State-preparation width.
        state_prep: usize,
    },

    /// The counting circuit needs more qubits than the backend offers.
    #[error("Counting circuit needs {required} qubits but capacity is {capacity}")]
    PrecisionOverflow {
        /// Qubits needed (precision + state + target).
        required: u32,
        /// Qubits available.
        capacity: u32,
    },

    /// Precision register width out of range.
    #[error("precision_width must be between 1 and {max}, got {got}", max = crate::counting::MAX_PRECISION)]
    InvalidPrecision {
        /// The requested width.
        got: u32,
    },

    /// Circuit builder returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] qtally_ir::IrError),
}

/// Result type for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;
