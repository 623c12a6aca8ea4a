//! Phase-estimation counting circuit.
//!
//! Layout, for precision width `p` and `n` state qubits:
//!
//! ```text
//!   prec[0..p]   ─ H ─ ●(G^1) ● (G^2) … ● (G^(2^(p-1))) ─ QFT† ─ M → meas[0..p]
//!   state[0..n]  ─ SP ─┤G├──────┤G├──────────┤G├─────────────
//!   target       ─ X H ┤G├──────┤G├──────────┤G├─────────────
//! ```
//!
//! Precision qubit `j` controls `2^j` applications of the iterate, so the
//! measured register holds a `p`-bit estimate of the iterate's eigenphase.

use tracing::debug;

use qtally_ir::{Circuit, QubitId};

use crate::error::{SynthError, SynthResult};
use crate::grover::GroverIterate;

/// Largest supported precision register.
pub const MAX_PRECISION: u32 = 16;

/// Builder for [`CountingCircuit`].
#[derive(Debug, Clone)]
pub struct CountingCircuitBuilder<'a> {
    iterate: &'a GroverIterate,
    precision_width: u32,
    qubit_capacity: Option<u32>,
}

impl<'a> CountingCircuitBuilder<'a> {
    /// Create a builder for the given iterate and precision width.
    pub fn new(iterate: &'a GroverIterate, precision_width: u32) -> Self {
        Self {
            iterate,
            precision_width,
            qubit_capacity: None,
        }
    }

    /// Fail with [`SynthError::PrecisionOverflow`] when the circuit would
    /// need more than `capacity` qubits.
    #[must_use]
    pub fn with_qubit_capacity(mut self, capacity: u32) -> Self {
        self.qubit_capacity = Some(capacity);
        self
    }

    /// Build the circuit, preparing the state register with `state_prep`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(&self, state_prep: &Circuit) -> SynthResult<CountingCircuit> {
        let p = self.precision_width;
        if p == 0 || p > MAX_PRECISION {
            return Err(SynthError::InvalidPrecision { got: p });
        }
        if state_prep.num_qubits() + 1 != self.iterate.num_qubits() as usize {
            return Err(SynthError::WidthMismatch {
                oracle: self.iterate.num_qubits() as usize,
                state_prep: state_prep.num_qubits(),
            });
        }

        let n = self.iterate.num_state_qubits();
        let required = p + n + 1;
        if let Some(capacity) = self.qubit_capacity {
            if required > capacity {
                return Err(SynthError::PrecisionOverflow { required, capacity });
            }
        }

        let mut circuit = Circuit::new("quantum_counting");
        let prec = circuit.add_qreg("prec", p);
        let state = circuit.add_qreg("state", n);
        let target = circuit.add_qreg("target", 1)[0];
        let meas = circuit.add_creg("meas", p);

        circuit.compose(&state_prep.unitary_normalized()?, &state)?;
        circuit.x(target)?.h(target)?;
        for &q in &prec {
            circuit.h(q)?;
        }

        for (j, &control) in prec.iter().enumerate() {
            let operands: Vec<QubitId> = std::iter::once(control)
                .chain(state.iter().copied())
                .chain([target])
                .collect();
            circuit.gate(self.iterate.controlled_power(1 << j), operands)?;
        }

        circuit.compose(&Circuit::qft(p)?.inverse()?, &prec)?;
        circuit.barrier_all()?;
        for (&q, &c) in prec.iter().zip(&meas) {
            circuit.measure(q, c)?;
        }

        debug!(
            precision_width = p,
            num_state_qubits = n,
            num_qubits = required,
            "built counting circuit"
        );

        Ok(CountingCircuit {
            circuit,
            precision_width: p,
            num_state_qubits: n,
        })
    }
}

/// A built counting circuit and the parameters needed to decode its
/// measurements.
#[derive(Debug, Clone)]
pub struct CountingCircuit {
    circuit: Circuit,
    precision_width: u32,
    num_state_qubits: u32,
}

impl CountingCircuit {
    /// The circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Consume and return the circuit.
    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }

    /// Width of the precision register.
    pub fn precision_width(&self) -> u32 {
        self.precision_width
    }

    /// Width of the state register.
    pub fn num_state_qubits(&self) -> u32 {
        self.num_state_qubits
    }

    /// Outcome shift introduced by the diffuser's global sign.
    ///
    /// The iterate equals minus the textbook Grover operator, which adds π
    /// to every eigenphase. Measured outcomes are therefore shifted by
    /// `2^(p-1)` modulo `2^p`.
    pub fn phase_offset(&self) -> u64 {
        1 << (self.precision_width - 1)
    }
}
