//! What a backend can run.

use serde::{Deserialize, Serialize};

use qtally_ir::{Gate, Instruction, InstructionKind};

/// Limits and instruction support advertised by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Backend name.
    pub name: String,
    /// Widest circuit accepted.
    pub num_qubits: u32,
    /// Most shots per job.
    pub max_shots: u32,
    /// Local simulator rather than a device.
    pub is_simulator: bool,
    /// Standard gates executed natively, by name.
    pub native_gates: Vec<String>,
    /// Non-gate instructions accepted, by name.
    pub operations: Vec<String>,
    /// Composite gates run as a unit, so controlled powers of a Grover
    /// iterate need no unrolling.
    pub composite_gates: bool,
}

impl Capabilities {
    /// A statevector simulator holding up to `num_qubits` qubits.
    pub fn simulator(num_qubits: u32) -> Self {
        let names = |list: &[&str]| list.iter().map(|s| (*s).to_string()).collect();
        Self {
            name: "simulator".into(),
            num_qubits,
            max_shots: 100_000,
            is_simulator: true,
            native_gates: names(&["x", "h", "ry", "p", "cx", "cp", "cry", "swap", "mcx"]),
            operations: names(&["measure", "barrier"]),
            composite_gates: true,
        }
    }

    /// Whether `instruction` can run here. Composite gates are accepted
    /// when every instruction of their body is.
    pub fn accepts(&self, instruction: &Instruction) -> bool {
        match &instruction.kind {
            InstructionKind::Gate(Gate::Standard(g)) => self.native_gates.iter().any(|n| n == g.name()),
            InstructionKind::Gate(Gate::Composite(g)) => {
                self.composite_gates && g.body.iter().all(|inst| self.accepts(inst))
            }
            _ => self.operations.iter().any(|n| n == instruction.name()),
        }
    }
}
