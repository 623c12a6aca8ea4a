//! Errors raised while building or transforming circuits.

use thiserror::Error;

use crate::qubit::{ClbitId, QubitId};

/// A circuit edit that was rejected.
///
/// `op` is the instruction name (`"mcx"`, `"measure"`, a composite gate's
/// name) so messages point at the offending operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// An operand names a qubit the circuit never declared.
    #[error("{op}: qubit {qubit} is not declared in this circuit")]
    UnknownQubit {
        /// The undeclared qubit.
        qubit: QubitId,
        /// Instruction that referenced it.
        op: String,
    },

    /// An operand names a classical bit the circuit never declared.
    #[error("{op}: classical bit {clbit} is not declared in this circuit")]
    UnknownClbit {
        /// The undeclared bit.
        clbit: ClbitId,
        /// Instruction that referenced it.
        op: String,
    },

    /// Operand count differs from the gate width.
    #[error("{op} acts on {expected} qubits but was given {given}")]
    WrongArity {
        /// Gate name.
        op: String,
        /// Width of the gate.
        expected: u32,
        /// Number of operands supplied.
        given: u32,
    },

    /// The same qubit appears twice among one instruction's operands.
    #[error("{op}: qubit {qubit} is used more than once")]
    RepeatedQubit {
        /// The repeated qubit.
        qubit: QubitId,
        /// Instruction that repeated it.
        op: String,
    },

    /// A sub-circuit was placed onto the wrong number of qubits.
    #[error("cannot place {width}-qubit circuit '{circuit}' onto {given} qubits")]
    WidthMismatch {
        /// Name of the sub-circuit.
        circuit: String,
        /// Its qubit count.
        width: usize,
        /// Number of target qubits supplied.
        given: usize,
    },

    /// The wire graph no longer orders its operations.
    #[error("corrupt wire graph: {0}")]
    CorruptGraph(String),

    /// A measure or reset where only gates are allowed.
    #[error("'{op}' is not unitary and cannot be {action}")]
    NonUnitary {
        /// Offending instruction.
        op: String,
        /// What was being attempted (inverted, packaged as a gate, ...).
        action: &'static str,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
