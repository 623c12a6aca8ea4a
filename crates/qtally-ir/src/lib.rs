//! Circuit representation shared by the qtally synthesizers and backends.
//!
//! A [`Circuit`] owns its declared qubits and classical bits (optionally
//! grouped into named registers) and a [`CircuitDag`] linking every
//! [`Instruction`] to the previous operation on each wire it touches.
//!
//! Gates are either one of the few [`StandardGate`]s the synthesizers emit
//! or a [`CompositeGate`]: a whole sub-circuit that can be controlled,
//! raised to a power and inverted without being unrolled. Grover iterates
//! and their controlled powers are carried this way.
//!
//! ```rust
//! use qtally_ir::{Circuit, QubitId};
//!
//! let mut flip = Circuit::with_size("flip", 1, 0);
//! flip.x(QubitId(0)).unwrap();
//! let twice = flip.to_gate("flip").unwrap().controlled(1).power(2);
//!
//! let mut circuit = Circuit::with_size("outer", 2, 0);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.gate(twice, [QubitId(0), QubitId(1)]).unwrap();
//! assert_eq!(circuit.depth().unwrap(), 2);
//! ```

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use dag::{CircuitDag, WireId};
pub use error::{IrError, IrResult};
pub use gate::{CompositeGate, Gate, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{Bit, Clbit, ClbitId, Qubit, QubitId, RegisterSlot};
