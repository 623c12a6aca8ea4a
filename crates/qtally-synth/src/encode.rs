//! Dataset superposition encoding.
//!
//! Each sample is thresholded into a basis index (bit `i` set when selected
//! feature `i` exceeds 0.5). The amplitude of index `b` is proportional to
//! the square root of how often `b` occurs, so measuring the prepared state
//! reproduces the empirical distribution of the data.

use std::collections::BTreeMap;

use tracing::debug;

use qtally_ir::{Circuit, QubitId};

use crate::error::{SynthError, SynthResult};

/// Largest supported number of encoded features.
pub const MAX_FEATURES: usize = 25;

/// Threshold above which a feature value encodes bit 1.
pub const BIT_THRESHOLD: f64 = 0.5;

/// Rotations smaller than this are skipped.
const ANGLE_EPSILON: f64 = 1e-12;

/// A real, non-negative, unit-norm state over `2^num_qubits` basis states.
///
/// Only non-zero amplitudes are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeVector {
    num_qubits: u32,
    entries: BTreeMap<usize, f64>,
}

impl AmplitudeVector {
    /// Build a normalized vector from basis-state multiplicities.
    ///
    /// Zero total mass collapses to `|0…0⟩`.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counts(num_qubits: u32, counts: &BTreeMap<usize, u64>) -> Self {
        let total: u64 = counts.values().sum();
        let entries = if total == 0 {
            BTreeMap::from([(0, 1.0)])
        } else {
            let norm = (total as f64).sqrt();
            counts
                .iter()
                .filter(|&(_, &c)| c > 0)
                .map(|(&i, &c)| (i, (c as f64).sqrt() / norm))
                .collect()
        };
        Self {
            num_qubits,
            entries,
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Logical length, `2^num_qubits`.
    pub fn len(&self) -> usize {
        1usize << self.num_qubits
    }

    /// Always false: even zero qubits hold one amplitude.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Amplitude of a basis state.
    pub fn amplitude(&self, index: usize) -> f64 {
        self.entries.get(&index).copied().unwrap_or(0.0)
    }

    /// Probability of a basis state.
    pub fn probability(&self, index: usize) -> f64 {
        self.amplitude(index).powi(2)
    }

    /// Sum of squared amplitudes.
    pub fn norm_sqr(&self) -> f64 {
        self.entries.values().map(|a| a * a).sum()
    }

    /// Non-zero `(index, amplitude)` pairs in index order.
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().map(|(&i, &a)| (i, a))
    }

    /// Number of non-zero amplitudes.
    pub fn support_size(&self) -> usize {
        self.entries.len()
    }

    /// Dense copy of all `2^num_qubits` amplitudes.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.len()];
        for (&i, &a) in &self.entries {
            dense[i] = a;
        }
        dense
    }
}

/// Encode a dataset as an amplitude vector and its preparation circuit.
///
/// `feature_indices` selects the columns to encode, in qubit order; `None`
/// uses every column of the first sample.
pub fn encode(
    dataset: &[Vec<f64>],
    feature_indices: Option<&[usize]>,
) -> SynthResult<(AmplitudeVector, Circuit)> {
    let all: Vec<usize>;
    let indices = match feature_indices {
        Some(indices) => indices,
        None => {
            all = (0..dataset.first().map_or(0, Vec::len)).collect();
            all.as_slice()
        }
    };

    if indices.len() > MAX_FEATURES {
        return Err(SynthError::TooManyFeatures {
            requested: indices.len(),
            max: MAX_FEATURES,
        });
    }

    let required = indices.iter().max().map_or(0, |&m| m + 1);
    let mut counts: BTreeMap<usize, u64> = BTreeMap::new();
    for (n, sample) in dataset.iter().enumerate() {
        if sample.len() < required {
            return Err(SynthError::Dimension {
                sample: n,
                len: sample.len(),
                required,
            });
        }
        let index = indices
            .iter()
            .enumerate()
            .filter(|&(_, &col)| sample[col] > BIT_THRESHOLD)
            .fold(0usize, |acc, (bit, _)| acc | (1 << bit));
        *counts.entry(index).or_default() += 1;
    }

    #[allow(clippy::cast_possible_truncation)]
    let amplitudes = AmplitudeVector::from_counts(indices.len() as u32, &counts);
    let circuit = state_preparation(&amplitudes)?;

    debug!(
        samples = dataset.len(),
        num_features = indices.len(),
        support = amplitudes.support_size(),
        "encoded dataset"
    );

    Ok((amplitudes, circuit))
}

/// Circuit preparing `amplitudes` from `|0…0⟩`.
///
/// Qubits are fixed from the most significant down. Qubit `q` receives
/// `Ry(2·atan2(√m1, √m0))` for every assignment of the qubits above it,
/// where `m0`/`m1` are the probability masses below that prefix with `q`
/// equal to 0/1. The rotation is controlled on the prefix, with controls
/// that must be 0 wrapped in X.
pub fn state_preparation(amplitudes: &AmplitudeVector) -> SynthResult<Circuit> {
    let n = amplitudes.num_qubits();
    let mut circuit = Circuit::new("state_prep");
    let qubits = circuit.add_qreg("state", n);

    for q in (0..n).rev() {
        let mut masses: BTreeMap<usize, (f64, f64)> = BTreeMap::new();
        for (index, amp) in amplitudes.nonzero() {
            let entry = masses.entry(index >> (q + 1)).or_default();
            if (index >> q) & 1 == 1 {
                entry.1 += amp * amp;
            } else {
                entry.0 += amp * amp;
            }
        }

        for (prefix, (m0, m1)) in masses {
            let theta = 2.0 * m1.sqrt().atan2(m0.sqrt());
            if theta.abs() < ANGLE_EPSILON {
                continue;
            }

            let controls: Vec<QubitId> = ((q + 1)..n).map(|c| qubits[c as usize]).collect();
            let zeros: Vec<QubitId> = ((q + 1)..n)
                .filter(|&c| (prefix >> (c - q - 1)) & 1 == 0)
                .map(|c| qubits[c as usize])
                .collect();
            let target = qubits[q as usize];

            for &z in &zeros {
                circuit.x(z)?;
            }
            controlled_ry(&mut circuit, theta, &controls, target)?;
            for &z in &zeros {
                circuit.x(z)?;
            }
        }
    }

    Ok(circuit)
}

#[allow(clippy::cast_possible_truncation)]
fn controlled_ry(
    circuit: &mut Circuit,
    theta: f64,
    controls: &[QubitId],
    target: QubitId,
) -> SynthResult<()> {
    match controls {
        [] => {
            circuit.ry(theta, target)?;
        }
        [c] => {
            circuit.cry(theta, *c, target)?;
        }
        _ => {
            let mut body = Circuit::with_size("mcry", 1, 0);
            body.ry(theta, QubitId(0))?;
            let gate = body.to_gate("mcry")?.controlled(controls.len() as u32);
            circuit.gate(gate, controls.iter().copied().chain([target]))?;
        }
    }
    Ok(())
}
