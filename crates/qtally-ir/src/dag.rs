//! Wire dependency graph behind [`crate::Circuit`].
//!
//! Nodes are instructions. An edge `a -> b` labelled with a wire means `b`
//! is the next operation on that wire after `a`. Operations on disjoint
//! wires share no path, so the longest path is the circuit depth.

use std::collections::BTreeMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{IrError, IrResult};
use crate::instruction::Instruction;
use crate::qubit::{ClbitId, QubitId};

/// A qubit or classical-bit wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireId {
    /// Quantum wire.
    Qubit(QubitId),
    /// Classical wire.
    Clbit(ClbitId),
}

/// Instructions linked along the wires they share.
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    graph: DiGraph<Instruction, WireId>,
    /// Declared wires and the latest operation on each.
    frontier: FxHashMap<WireId, Option<NodeIndex>>,
    num_qubits: usize,
    num_clbits: usize,
}

impl CircuitDag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a qubit wire. Declaring it twice is a no-op.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.declare(WireId::Qubit(qubit)) {
            self.num_qubits += 1;
        }
    }

    /// Declare a classical wire. Declaring it twice is a no-op.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        if self.declare(WireId::Clbit(clbit)) {
            self.num_clbits += 1;
        }
    }

    fn declare(&mut self, wire: WireId) -> bool {
        if self.frontier.contains_key(&wire) {
            return false;
        }
        self.frontier.insert(wire, None);
        true
    }

    /// Validate `instruction` and link it after the current operation on
    /// each of its wires.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        let op = instruction.name().to_string();

        if let Some(gate) = instruction.as_gate() {
            let expected = gate.num_qubits();
            let given = instruction.qubits.len() as u32;
            if expected != given {
                return Err(IrError::WrongArity {
                    op,
                    expected,
                    given,
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !self.frontier.contains_key(&WireId::Qubit(qubit)) {
                return Err(IrError::UnknownQubit { qubit, op });
            }
            if !seen.insert(qubit) {
                return Err(IrError::RepeatedQubit { qubit, op });
            }
        }
        if let Some(&clbit) = instruction
            .clbits
            .iter()
            .find(|c| !self.frontier.contains_key(&WireId::Clbit(**c)))
        {
            return Err(IrError::UnknownClbit { clbit, op });
        }

        let wires: Vec<WireId> = instruction
            .qubits
            .iter()
            .map(|&q| WireId::Qubit(q))
            .chain(instruction.clbits.iter().map(|&c| WireId::Clbit(c)))
            .collect();

        let node = self.graph.add_node(instruction);
        for wire in wires {
            if let Some(Some(prev)) = self.frontier.insert(wire, Some(node)) {
                self.graph.add_edge(prev, node, wire);
            }
        }
        Ok(node)
    }

    fn order(&self) -> IrResult<Vec<NodeIndex>> {
        petgraph::algo::toposort(&self.graph, None).map_err(|cycle| {
            IrError::CorruptGraph(format!(
                "'{}' depends on itself",
                self.graph[cycle.node_id()].name()
            ))
        })
    }

    /// Instructions in an order that respects every wire.
    pub fn topological_ops(&self) -> IrResult<Vec<&Instruction>> {
        Ok(self
            .order()?
            .into_iter()
            .map(|node| &self.graph[node])
            .collect())
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// Number of instructions, directives included.
    pub fn num_ops(&self) -> usize {
        self.graph.node_count()
    }

    /// Longest chain of non-directive operations.
    pub fn depth(&self) -> IrResult<usize> {
        let mut layer: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        for node in self.order()? {
            let after = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .filter_map(|p| layer.get(&p).copied())
                .max()
                .unwrap_or(0);
            let own = usize::from(!self.graph[node].is_directive());
            layer.insert(node, after + own);
        }
        Ok(layer.into_values().max().unwrap_or(0))
    }

    /// Instruction count per name.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for inst in self.graph.node_weights() {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }
}
