//! Circuit builder.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::{CompositeGate, Gate, StandardGate};
use crate::instruction::Instruction;
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};

/// A named circuit over declared qubits and classical bits.
///
/// Every builder call is checked against the wire graph and returns
/// `&mut Self`, so edits chain with `?`:
///
/// ```rust
/// use qtally_ir::{Circuit, QubitId};
///
/// let mut c = Circuit::with_size("flag", 3, 0);
/// c.x(QubitId(1))?.mcx(&[QubitId(0), QubitId(1)], QubitId(2))?.x(QubitId(1))?;
/// assert_eq!(c.count_ops()["x"], 2);
/// # Ok::<(), qtally_ir::IrError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    qubits: Vec<Qubit>,
    clbits: Vec<Clbit>,
    dag: CircuitDag,
}

impl Circuit {
    /// An empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: Vec::new(),
            clbits: Vec::new(),
            dag: CircuitDag::new(),
        }
    }

    /// A circuit with `num_qubits` anonymous qubits and `num_clbits` bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    #[allow(clippy::cast_possible_truncation)]
    fn push_qubit(&mut self, slot: Option<(&str, u32)>) -> QubitId {
        let id = QubitId(self.qubits.len() as u32);
        self.qubits.push(match slot {
            Some((reg, offset)) => Qubit::in_register(id, reg, offset),
            None => Qubit::new(id),
        });
        self.dag.add_qubit(id);
        id
    }

    #[allow(clippy::cast_possible_truncation)]
    fn push_clbit(&mut self, slot: Option<(&str, u32)>) -> ClbitId {
        let id = ClbitId(self.clbits.len() as u32);
        self.clbits.push(match slot {
            Some((reg, offset)) => Clbit::in_register(id, reg, offset),
            None => Clbit::new(id),
        });
        self.dag.add_clbit(id);
        id
    }

    /// Declare one more qubit.
    pub fn add_qubit(&mut self) -> QubitId {
        self.push_qubit(None)
    }

    /// Declare `size` qubits as register `name`. Ids continue from the
    /// qubits already declared.
    pub fn add_qreg(&mut self, name: &str, size: u32) -> Vec<QubitId> {
        (0..size).map(|i| self.push_qubit(Some((name, i)))).collect()
    }

    /// Declare one more classical bit.
    pub fn add_clbit(&mut self) -> ClbitId {
        self.push_clbit(None)
    }

    /// Declare `size` classical bits as register `name`.
    pub fn add_creg(&mut self, name: &str, size: u32) -> Vec<ClbitId> {
        (0..size).map(|i| self.push_clbit(Some((name, i)))).collect()
    }

    fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.dag.apply(instruction)?;
        Ok(self)
    }

    fn standard(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::gate(gate, qubits))
    }

    // =========================================================================
    // Gates
    // =========================================================================

    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::H, [qubit])
    }

    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::X, [qubit])
    }

    /// Y rotation by `theta`.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::Ry(theta), [qubit])
    }

    /// Phase `e^{iθ}` on |1⟩.
    pub fn p(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::P(theta), [qubit])
    }

    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::CX, [control, target])
    }

    pub fn cp(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::CP(theta), [control, target])
    }

    pub fn cry(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::CRy(theta), [control, target])
    }

    pub fn swap(&mut self, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.standard(StandardGate::Swap, [a, b])
    }

    /// X on `target` when every control is |1⟩. No controls means plain X.
    pub fn mcx(&mut self, controls: &[QubitId], target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::mcx(controls, target))
    }

    /// Place any gate, composite gates included.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::gate(gate, qubits))
    }

    // =========================================================================
    // Measurement and directives
    // =========================================================================

    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.push(Instruction::measure(qubit, clbit))
    }

    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::reset(qubit))
    }

    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.push(Instruction::barrier(qubits))
    }

    /// Barrier across every qubit.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let all: Vec<QubitId> = self.qubits.iter().map(|q| q.id).collect();
        self.barrier(all)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Declared qubits with their register slots.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Qubits of register `name`, in register order. Empty if no such
    /// register exists.
    pub fn qreg(&self, name: &str) -> Vec<QubitId> {
        self.qubits
            .iter()
            .filter(|q| q.register() == Some(name))
            .map(|q| q.id)
            .collect()
    }

    /// Longest chain of gates and measurements. Barriers add nothing.
    pub fn depth(&self) -> IrResult<usize> {
        self.dag.depth()
    }

    /// Instructions in execution order.
    pub fn instructions(&self) -> IrResult<Vec<&Instruction>> {
        self.dag.topological_ops()
    }

    /// Instruction count per name.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        self.dag.count_ops()
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Gate instructions in order, barriers skipped. Measure and reset
    /// fail with `NonUnitary`, naming `action`.
    fn gate_instructions(&self, action: &'static str) -> IrResult<Vec<Instruction>> {
        let mut gates = Vec::new();
        for inst in self.instructions()? {
            if inst.is_directive() {
                continue;
            }
            if !inst.is_gate() {
                return Err(IrError::NonUnitary {
                    op: inst.name().to_string(),
                    action,
                });
            }
            gates.push(inst.clone());
        }
        Ok(gates)
    }

    /// Index of each qubit id in declaration order.
    #[allow(clippy::cast_possible_truncation)]
    fn positions(&self) -> FxHashMap<QubitId, QubitId> {
        self.qubits
            .iter()
            .enumerate()
            .map(|(i, q)| (q.id, QubitId(i as u32)))
            .collect()
    }

    /// Package the circuit as one gate over its `num_qubits()` qubits.
    ///
    /// The body addresses qubits by declaration position, so it can be
    /// placed anywhere with [`Circuit::gate`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_gate(&self, name: impl Into<String>) -> IrResult<CompositeGate> {
        let name = name.into();
        let local = self.positions();
        let body = self
            .gate_instructions("packaged as a gate")?
            .iter()
            .map(|inst| {
                inst.try_remap(|q| {
                    local.get(&q).copied().ok_or_else(|| IrError::UnknownQubit {
                        qubit: q,
                        op: name.clone(),
                    })
                })
            })
            .collect::<IrResult<Vec<_>>>()?;
        Ok(CompositeGate::new(name, self.qubits.len() as u32, body))
    }

    /// The same qubits and registers with no classical bits or instructions.
    fn blank(&self, name: String) -> Self {
        let mut out = Self::new(name);
        for q in &self.qubits {
            out.dag.add_qubit(q.id);
        }
        out.qubits.clone_from(&self.qubits);
        out
    }

    /// A copy with barriers and classical bits dropped.
    ///
    /// Fails if the circuit measures or resets.
    pub fn unitary_normalized(&self) -> IrResult<Self> {
        let mut out = self.blank(self.name.clone());
        for inst in self.gate_instructions("normalized")? {
            out.push(inst)?;
        }
        Ok(out)
    }

    /// The adjoint: gates in reverse order, each inverted. Named `<name>_dg`.
    pub fn inverse(&self) -> IrResult<Self> {
        let mut out = self.blank(format!("{}_dg", self.name));
        for inst in self.gate_instructions("inverted")?.iter().rev() {
            out.push(inst.inverse()?)?;
        }
        Ok(out)
    }

    /// Append `other`, its i-th qubit landing on `qubits[i]`.
    ///
    /// `other` must not touch classical bits.
    pub fn compose(&mut self, other: &Circuit, qubits: &[QubitId]) -> IrResult<&mut Self> {
        if qubits.len() != other.num_qubits() {
            return Err(IrError::WidthMismatch {
                circuit: other.name.clone(),
                width: other.num_qubits(),
                given: qubits.len(),
            });
        }
        let placement: FxHashMap<QubitId, QubitId> = other
            .qubits
            .iter()
            .map(|q| q.id)
            .zip(qubits.iter().copied())
            .collect();

        for inst in other.instructions()? {
            if !inst.clbits.is_empty() {
                return Err(IrError::NonUnitary {
                    op: inst.name().to_string(),
                    action: "composed",
                });
            }
            let placed = inst.try_remap(|q| {
                placement.get(&q).copied().ok_or_else(|| IrError::UnknownQubit {
                    qubit: q,
                    op: inst.name().to_string(),
                })
            })?;
            self.push(placed)?;
        }
        Ok(self)
    }

    // =========================================================================
    // Library circuits
    // =========================================================================

    /// Little-endian quantum Fourier transform on `n` qubits.
    ///
    /// |x⟩ ↦ Σ_k e^{2πi·x·k/2^n} |k⟩ / √2^n, qubit 0 the least significant
    /// bit of both `x` and `k`.
    pub fn qft(n: u32) -> IrResult<Self> {
        use std::f64::consts::PI;

        let mut circuit = Self::with_size(format!("qft_{n}"), n, 0);

        for j in (0..n).rev() {
            circuit.h(QubitId(j))?;
            for k in (0..j).rev() {
                circuit.cp(PI / f64::from(1u32 << (j - k)), QubitId(k), QubitId(j))?;
            }
        }
        for i in 0..n / 2 {
            circuit.swap(QubitId(i), QubitId(n - 1 - i))?;
        }

        Ok(circuit)
    }
}
