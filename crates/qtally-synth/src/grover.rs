//! Grover iterate composition.
//!
//! The iterate acts on the state register plus the oracle's flag qubit `f`:
//!
//! ```text
//!   G = D · O
//!   D = H(f) X(f) SP†(s) X(all) H(f) MCX(s → f) H(f) X(all) SP(s) X(f) H(f)
//! ```
//!
//! With `f` prepared in `|−⟩`, `O` becomes a phase flip of marked states
//! and `D` reflects about `SP|0⟩`. `D` carries a global factor of −1
//! relative to the textbook reflection, which shows up as a fixed offset
//! once the iterate is controlled (see
//! [`CountingCircuit::phase_offset`](crate::counting::CountingCircuit::phase_offset)).

use tracing::debug;

use qtally_ir::{Circuit, CompositeGate, QubitId};

use crate::error::{SynthError, SynthResult};

/// Oracle followed by diffuser, packaged as one opaque gate.
#[derive(Debug, Clone)]
pub struct GroverIterate {
    gate: CompositeGate,
    num_state_qubits: u32,
}

impl GroverIterate {
    /// Compose an oracle over `n + 1` qubits with a state preparation over
    /// `n` qubits.
    #[allow(clippy::cast_possible_truncation)]
    pub fn compose(oracle: &Circuit, state_prep: &Circuit) -> SynthResult<Self> {
        if oracle.num_qubits() != state_prep.num_qubits() + 1 {
            return Err(SynthError::WidthMismatch {
                oracle: oracle.num_qubits(),
                state_prep: state_prep.num_qubits(),
            });
        }

        let width = oracle.num_qubits() as u32;
        let mut circuit = Circuit::with_size("grover", width, 0);
        let all: Vec<QubitId> = (0..width).map(QubitId).collect();

        circuit.gate(oracle.unitary_normalized()?.to_gate("oracle")?, all.iter().copied())?;
        append_diffuser(&mut circuit, state_prep)?;

        let gate = circuit.to_gate("grover")?;
        debug!(
            num_qubits = width,
            body_len = gate.body.len(),
            "composed grover iterate"
        );

        Ok(Self {
            gate,
            num_state_qubits: width - 1,
        })
    }

    /// The diffuser alone, over `state_prep.num_qubits() + 1` qubits.
    #[allow(clippy::cast_possible_truncation)]
    pub fn diffuser(state_prep: &Circuit) -> SynthResult<Circuit> {
        let mut circuit = Circuit::with_size("diffuser", state_prep.num_qubits() as u32 + 1, 0);
        append_diffuser(&mut circuit, state_prep)?;
        Ok(circuit)
    }

    /// Total width: state qubits plus the flag.
    pub fn num_qubits(&self) -> u32 {
        self.num_state_qubits + 1
    }

    /// Number of state qubits.
    pub fn num_state_qubits(&self) -> u32 {
        self.num_state_qubits
    }

    /// The iterate as a single gate.
    pub fn gate(&self) -> &CompositeGate {
        &self.gate
    }

    /// `k` sequential applications. `power(0)` is the identity.
    pub fn power(&self, k: u32) -> CompositeGate {
        self.gate.clone().power(k)
    }

    /// `power(k)` with one control qubit prepended.
    pub fn controlled_power(&self, k: u32) -> CompositeGate {
        self.power(k).controlled(1)
    }
}

/// Append the diffuser to a circuit whose last qubit is the flag and whose
/// remaining qubits are the state register.
#[allow(clippy::cast_possible_truncation)]
fn append_diffuser(circuit: &mut Circuit, state_prep: &Circuit) -> SynthResult<()> {
    let n = state_prep.num_qubits() as u32;
    let flag = QubitId(n);
    let state: Vec<QubitId> = (0..n).map(QubitId).collect();
    let all: Vec<QubitId> = (0..=n).map(QubitId).collect();

    let prep = state_prep.unitary_normalized()?.to_gate("state_prep")?;
    let prep_dg = prep.inverse()?;

    circuit.h(flag)?.x(flag)?;
    if n > 0 {
        circuit.gate(prep_dg, state.iter().copied())?;
    }
    for &q in &all {
        circuit.x(q)?;
    }
    circuit.h(flag)?.mcx(&state, flag)?.h(flag)?;
    for &q in &all {
        circuit.x(q)?;
    }
    if n > 0 {
        circuit.gate(prep, state.iter().copied())?;
    }
    circuit.x(flag)?.h(flag)?;

    Ok(())
}
