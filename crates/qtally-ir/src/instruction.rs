//! Operations placed on circuit wires.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::qubit::{ClbitId, QubitId};

/// What an instruction does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// Apply a gate.
    Gate(Gate),
    /// Read one qubit into one classical bit.
    Measure,
    /// Return a qubit to |0⟩.
    Reset,
    /// Keep operations from moving across this point. No effect on the state.
    Barrier,
}

/// An operation together with the wires it touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The operation.
    pub kind: InstructionKind,
    /// Qubit operands, controls first for controlled gates.
    pub qubits: Vec<QubitId>,
    /// Classical operands; only measurements have any.
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    fn on_qubits(kind: InstructionKind, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind,
            qubits: qubits.into_iter().collect(),
            clbits: Vec::new(),
        }
    }

    /// A gate on `qubits`.
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::on_qubits(InstructionKind::Gate(gate.into()), qubits)
    }

    /// X on `target` conditioned on every qubit in `controls`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn mcx(controls: &[QubitId], target: QubitId) -> Self {
        let operands = controls.iter().copied().chain([target]);
        Self::gate(StandardGate::MCX(controls.len() as u32), operands)
    }

    /// Measure `qubit` into `clbit`.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    /// Reset `qubit`.
    pub fn reset(qubit: QubitId) -> Self {
        Self::on_qubits(InstructionKind::Reset, [qubit])
    }

    /// Barrier across `qubits`.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::on_qubits(InstructionKind::Barrier, qubits)
    }

    /// The gate, if this places one.
    pub fn as_gate(&self) -> Option<&Gate> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    pub fn is_gate(&self) -> bool {
        self.as_gate().is_some()
    }

    pub fn is_measure(&self) -> bool {
        self.kind == InstructionKind::Measure
    }

    /// Barriers order the schedule but leave the state alone.
    pub fn is_directive(&self) -> bool {
        self.kind == InstructionKind::Barrier
    }

    /// Gate name, or `measure` / `reset` / `barrier`.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
        }
    }

    /// A copy with every qubit operand passed through `map`.
    pub fn try_remap(
        &self,
        mut map: impl FnMut(QubitId) -> IrResult<QubitId>,
    ) -> IrResult<Self> {
        let qubits = self
            .qubits
            .iter()
            .map(|&q| map(q))
            .collect::<IrResult<Vec<_>>>()?;
        Ok(Self {
            qubits,
            ..self.clone()
        })
    }

    /// The adjoint on the same operands. Barriers are their own adjoint;
    /// measure and reset have none.
    pub fn inverse(&self) -> IrResult<Self> {
        let kind = match &self.kind {
            InstructionKind::Gate(g) => InstructionKind::Gate(g.inverse()?),
            InstructionKind::Barrier => InstructionKind::Barrier,
            InstructionKind::Measure | InstructionKind::Reset => {
                return Err(IrError::NonUnitary {
                    op: self.name().to_string(),
                    action: "inverted",
                });
            }
        };
        Ok(Self {
            kind,
            ..self.clone()
        })
    }
}
