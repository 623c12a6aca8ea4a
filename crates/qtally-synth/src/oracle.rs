//! Oracle synthesis from DNF terms.
//!
//! Each term becomes one block on the input register:
//!
//! ```text
//!   X on zero-valued inputs ─ MCX(inputs → flag) ─ X on zero-valued inputs
//! ```
//!
//! Blocks are applied in term order. Terms that overlap on some input both
//! fire, so the flag ends up as the XOR of the satisfied terms rather than
//! their OR. Terms extracted from a single tree are disjoint, so the two
//! agree there.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use qtally_ir::{Circuit, QubitId};

use crate::encode::MAX_FEATURES;
use crate::error::{SynthError, SynthResult};
use crate::extract::ConditionSet;
use crate::features::FeatureIndexMap;

/// Statistics from oracle synthesis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OracleReport {
    /// Terms turned into MCX blocks.
    pub emitted: usize,
    /// Terms with no condition on a mapped feature.
    pub skipped_empty: usize,
    /// Terms requiring one qubit to be both 0 and 1.
    pub skipped_unsatisfiable: usize,
}

/// A term projected onto qubit indices.
enum Projection {
    Empty,
    Unsatisfiable,
    Literals(BTreeMap<usize, bool>),
}

fn project(term: &ConditionSet, map: &FeatureIndexMap) -> Projection {
    let mut literals = BTreeMap::new();
    for cond in term {
        let Some(qubit) = map.get(&cond.feature) else {
            continue;
        };
        match literals.insert(qubit, cond.value) {
            Some(previous) if previous != cond.value => return Projection::Unsatisfiable,
            _ => {}
        }
    }
    if literals.is_empty() {
        Projection::Empty
    } else {
        Projection::Literals(literals)
    }
}

/// Synthesize the oracle for a set of DNF terms.
///
/// The circuit has `map.len() + 1` qubits: inputs `0..map.len()` in the
/// `input` register and the flag in the `flag` register.
pub fn synthesize<'a>(
    terms: impl IntoIterator<Item = &'a ConditionSet>,
    map: &FeatureIndexMap,
) -> SynthResult<Circuit> {
    synthesize_with_report(terms, map).map(|(circuit, _)| circuit)
}

/// Synthesize the oracle and report which terms were skipped.
#[allow(clippy::cast_possible_truncation)]
pub fn synthesize_with_report<'a>(
    terms: impl IntoIterator<Item = &'a ConditionSet>,
    map: &FeatureIndexMap,
) -> SynthResult<(Circuit, OracleReport)> {
    let num_vars = map.len();
    let mut circuit = Circuit::new("oracle");
    let inputs = circuit.add_qreg("input", num_vars as u32);
    let flag = circuit.add_qreg("flag", 1)[0];

    let mut report = OracleReport::default();

    for term in terms {
        let literals = match project(term, map) {
            Projection::Literals(literals) => literals,
            Projection::Empty => {
                debug!(term = %term, "term has no mapped features, skipping");
                report.skipped_empty += 1;
                continue;
            }
            Projection::Unsatisfiable => {
                warn!(term = %term, "term is unsatisfiable, skipping");
                report.skipped_unsatisfiable += 1;
                continue;
            }
        };

        let zeros: Vec<QubitId> = literals
            .iter()
            .filter(|&(_, &v)| !v)
            .map(|(&q, _)| inputs[q])
            .collect();
        let controls: Vec<QubitId> = literals.keys().map(|&q| inputs[q]).collect();

        for &q in &zeros {
            circuit.x(q)?;
        }
        circuit.mcx(&controls, flag)?;
        for &q in &zeros {
            circuit.x(q)?;
        }
        report.emitted += 1;
    }

    debug!(
        num_vars,
        emitted = report.emitted,
        skipped_empty = report.skipped_empty,
        skipped_unsatisfiable = report.skipped_unsatisfiable,
        "synthesised oracle"
    );

    Ok((circuit, report))
}

/// Flag value the oracle computes for a basis input.
///
/// Bit `i` of `input` is the value of the feature on qubit `i`.
pub fn evaluate<'a>(
    terms: impl IntoIterator<Item = &'a ConditionSet>,
    map: &FeatureIndexMap,
    input: usize,
) -> bool {
    terms
        .into_iter()
        .filter(|term| match project(term, map) {
            Projection::Literals(literals) => literals
                .iter()
                .all(|(&q, &v)| ((input >> q) & 1 == 1) == v),
            Projection::Empty | Projection::Unsatisfiable => false,
        })
        .count()
        % 2
        == 1
}

/// Flag value for every basis input, indexed by input.
pub fn truth_table<'a>(
    terms: impl IntoIterator<Item = &'a ConditionSet> + Clone,
    map: &FeatureIndexMap,
) -> SynthResult<Vec<bool>> {
    if map.len() > MAX_FEATURES {
        return Err(SynthError::TooManyFeatures {
            requested: map.len(),
            max: MAX_FEATURES,
        });
    }
    Ok((0..1usize << map.len())
        .map(|input| evaluate(terms.clone(), map, input))
        .collect())
}
