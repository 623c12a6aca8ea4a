//! Gates: the standard set the synthesizers emit, plus composite gates
//! wrapping whole sub-circuits.

use serde::{Deserialize, Serialize};

use crate::error::IrResult;
use crate::instruction::Instruction;

/// Built-in gates.
///
/// Controlled variants list their controls first, then the target, so every
/// gate reduces to a controls mask plus a single-target (or swap) action.
/// Angles are radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Bit flip.
    X,
    /// Hadamard.
    H,
    /// Rotation about Y by the angle.
    Ry(f64),
    /// Phase `diag(1, e^{iθ})`.
    P(f64),
    /// Controlled X.
    CX,
    /// Controlled phase.
    CP(f64),
    /// Controlled Y rotation.
    CRy(f64),
    /// Exchange two qubits.
    Swap,
    /// X on the target when all `n` controls are set. `MCX(0)` is a plain X.
    MCX(u32),
}

impl StandardGate {
    /// Lower-case gate name.
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::X => "x",
            StandardGate::H => "h",
            StandardGate::Ry(_) => "ry",
            StandardGate::P(_) => "p",
            StandardGate::CX => "cx",
            StandardGate::CP(_) => "cp",
            StandardGate::CRy(_) => "cry",
            StandardGate::Swap => "swap",
            StandardGate::MCX(_) => "mcx",
        }
    }

    /// Number of leading operands that act as controls.
    pub fn num_controls(&self) -> u32 {
        match self {
            StandardGate::CX | StandardGate::CP(_) | StandardGate::CRy(_) => 1,
            StandardGate::MCX(n) => *n,
            _ => 0,
        }
    }

    /// Total operand count.
    pub fn num_qubits(&self) -> u32 {
        let body = match self {
            StandardGate::Swap => 2,
            _ => 1,
        };
        self.num_controls() + body
    }

    /// The adjoint. Flips and swaps are self-inverse; angles negate.
    pub fn inverse(&self) -> StandardGate {
        match self {
            StandardGate::Ry(t) => StandardGate::Ry(-t),
            StandardGate::P(t) => StandardGate::P(-t),
            StandardGate::CP(t) => StandardGate::CP(-t),
            StandardGate::CRy(t) => StandardGate::CRy(-t),
            other => other.clone(),
        }
    }
}

/// A sub-circuit applied as a single gate.
///
/// The body addresses local qubits `0..num_qubits`. Operands are the
/// `num_ctrl` controls followed by the body qubits; the body runs `power`
/// times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeGate {
    /// Gate name, shown in operation counts.
    pub name: String,
    /// Width of the body.
    pub num_qubits: u32,
    /// Gate instructions over local qubits.
    pub body: Vec<Instruction>,
    /// Controls prepended to the operands.
    pub num_ctrl: u32,
    /// Repetitions of the body.
    pub power: u32,
}

impl CompositeGate {
    /// Wrap `body` as an uncontrolled gate applied once.
    ///
    /// [`crate::Circuit::to_gate`] builds one from a circuit and checks the
    /// body is unitary.
    pub fn new(name: impl Into<String>, num_qubits: u32, body: Vec<Instruction>) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            body,
            num_ctrl: 0,
            power: 1,
        }
    }

    /// Controls plus body width.
    pub fn total_qubits(&self) -> u32 {
        self.num_ctrl + self.num_qubits
    }

    /// Prepend `n` more controls.
    #[must_use]
    pub fn controlled(mut self, n: u32) -> Self {
        self.num_ctrl += n;
        self
    }

    /// Raise to the `k`-th power. Powers compose multiplicatively and
    /// `k = 0` gives the identity.
    #[must_use]
    pub fn power(mut self, k: u32) -> Self {
        self.power = self.power.saturating_mul(k);
        self
    }

    /// The adjoint, named `<name>_dg` (or back to `<name>` if already one).
    pub fn inverse(&self) -> IrResult<Self> {
        let body = self
            .body
            .iter()
            .rev()
            .map(Instruction::inverse)
            .collect::<IrResult<Vec<_>>>()?;
        let name = match self.name.strip_suffix("_dg") {
            Some(base) => base.to_string(),
            None => format!("{}_dg", self.name),
        };
        Ok(Self {
            name,
            body,
            ..self.clone()
        })
    }
}

/// A gate placed by an instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    /// One of the built-in gates.
    Standard(StandardGate),
    /// A wrapped sub-circuit.
    Composite(CompositeGate),
}

impl Gate {
    /// Gate name.
    pub fn name(&self) -> &str {
        match self {
            Gate::Standard(g) => g.name(),
            Gate::Composite(g) => &g.name,
        }
    }

    /// Operand count, controls included.
    pub fn num_qubits(&self) -> u32 {
        match self {
            Gate::Standard(g) => g.num_qubits(),
            Gate::Composite(g) => g.total_qubits(),
        }
    }

    /// The adjoint gate.
    pub fn inverse(&self) -> IrResult<Self> {
        Ok(match self {
            Gate::Standard(g) => Gate::Standard(g.inverse()),
            Gate::Composite(g) => Gate::Composite(g.inverse()?),
        })
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::Standard(gate)
    }
}

impl From<CompositeGate> for Gate {
    fn from(gate: CompositeGate) -> Self {
        Gate::Composite(gate)
    }
}
