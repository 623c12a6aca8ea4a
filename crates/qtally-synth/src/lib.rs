//! `qtally-synth` — decision-tree oracle and quantum counting circuit synthesis.
//!
//! Turns a binary decision tree and a dataset into a phase-estimation
//! circuit whose measured outcome estimates how many dataset states the
//! tree classifies as positive:
//!
//! - **Extraction**: positive-class root-to-leaf paths as DNF terms
//! - **Oracle**: one X / multi-controlled-X / X block per term
//! - **Encoding**: dataset histogram as a real amplitude vector plus an
//!   Ry-tree state preparation
//! - **Grover iterate**: oracle followed by diffuser as one opaque gate
//! - **Counting**: controlled powers of the iterate, inverse QFT, measure
//!
//! # Quick start
//!
//! ```rust
//! use qtally_synth::encode::encode;
//! use qtally_synth::extract::extract;
//! use qtally_synth::features::FeatureIndexMap;
//! use qtally_synth::oracle::synthesize;
//! use qtally_synth::tree::{DecisionTree, TreeNode};
//! use qtally_synth::{CountingCircuitBuilder, GroverIterate};
//!
//! // pixel_0 == 1 → class 1
//! let tree = DecisionTree::new(vec![
//!     TreeNode::Split { feature: Some(0), left: 1, right: 2 },
//!     TreeNode::Leaf { class_counts: vec![1.0, 0.0] },
//!     TreeNode::Leaf { class_counts: vec![0.0, 1.0] },
//! ]);
//! let names = ["pixel_0"];
//!
//! let terms = extract(&tree, &names, 1).unwrap();
//! let map = FeatureIndexMap::from_names(names).unwrap();
//! let oracle = synthesize(&terms, &map).unwrap();
//! let (_, state_prep) = encode(&[vec![1.0]], None).unwrap();
//!
//! let iterate = GroverIterate::compose(&oracle, &state_prep).unwrap();
//! let counting = CountingCircuitBuilder::new(&iterate, 3)
//!     .build(&state_prep)
//!     .unwrap();
//! assert_eq!(counting.circuit().num_qubits(), 5);
//! ```

pub mod counting;
pub mod encode;
pub mod error;
pub mod extract;
pub mod features;
pub mod grover;
pub mod oracle;
pub mod tree;

pub use counting::{CountingCircuit, CountingCircuitBuilder, MAX_PRECISION};
pub use encode::{AmplitudeVector, MAX_FEATURES};
pub use error::{SynthError, SynthResult};
pub use extract::{ConditionSet, PathCondition};
pub use features::FeatureIndexMap;
pub use grover::GroverIterate;
pub use oracle::OracleReport;
pub use tree::{DecisionTree, FlatTree, NodeId, TreeNode};
