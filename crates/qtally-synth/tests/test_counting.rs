//! Tests for the phase-estimation counting circuit.

use std::collections::BTreeSet;

use qtally_adapter_sim::Statevector;
use qtally_ir::{Circuit, QubitId};
use qtally_synth::encode::encode;
use qtally_synth::extract::extract;
use qtally_synth::features::FeatureIndexMap;
use qtally_synth::oracle::synthesize;
use qtally_synth::tree::{DecisionTree, TreeNode};
use qtally_synth::{CountingCircuitBuilder, GroverIterate, MAX_PRECISION, SynthError};

fn stump() -> DecisionTree {
    DecisionTree::new(vec![
        TreeNode::Split {
            feature: Some(0),
            left: 1,
            right: 2,
        },
        TreeNode::Leaf {
            class_counts: vec![1.0, 0.0],
        },
        TreeNode::Leaf {
            class_counts: vec![0.0, 1.0],
        },
    ])
}

fn setup(data: &[Vec<f64>]) -> (GroverIterate, Circuit) {
    let names = ["pixel_0"];
    let terms = extract(&stump(), &names, 1).unwrap();
    let map = FeatureIndexMap::from_names(names).unwrap();
    let oracle = synthesize(&terms, &map).unwrap();
    let (_, state_prep) = encode(data, None).unwrap();
    let iterate = GroverIterate::compose(&oracle, &state_prep).unwrap();
    (iterate, state_prep)
}

/// Probability of each precision-register outcome.
fn outcome_distribution(circuit: &Circuit, precision: u32) -> Vec<f64> {
    let mut sv = Statevector::new(circuit.num_qubits());
    for inst in circuit.instructions().unwrap() {
        sv.apply(inst).unwrap();
    }
    let mask = (1usize << precision) - 1;
    let mut dist = vec![0.0; 1 << precision];
    for (index, p) in sv.probabilities().into_iter().enumerate() {
        dist[index & mask] += p;
    }
    dist
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn precision_out_of_range() {
    let (iterate, state_prep) = setup(&[vec![1.0]]);
    assert!(matches!(
        CountingCircuitBuilder::new(&iterate, 0).build(&state_prep),
        Err(SynthError::InvalidPrecision { got: 0 })
    ));
    assert!(matches!(
        CountingCircuitBuilder::new(&iterate, MAX_PRECISION + 1).build(&state_prep),
        Err(SynthError::InvalidPrecision { got: 17 })
    ));
}

#[test]
fn state_prep_width_must_match_iterate() {
    let (iterate, _) = setup(&[vec![1.0]]);
    let (_, wide_prep) = encode(&[vec![1.0, 1.0]], None).unwrap();
    assert!(matches!(
        CountingCircuitBuilder::new(&iterate, 3).build(&wide_prep),
        Err(SynthError::WidthMismatch { .. })
    ));
}

#[test]
fn capacity_is_enforced() {
    let (iterate, state_prep) = setup(&[vec![1.0]]);
    assert!(matches!(
        CountingCircuitBuilder::new(&iterate, 4)
            .with_qubit_capacity(5)
            .build(&state_prep),
        Err(SynthError::PrecisionOverflow {
            required: 6,
            capacity: 5
        })
    ));
    assert!(
        CountingCircuitBuilder::new(&iterate, 4)
            .with_qubit_capacity(6)
            .build(&state_prep)
            .is_ok()
    );
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

#[test]
fn registers_and_layout() {
    let (iterate, state_prep) = setup(&[vec![1.0]]);
    let counting = CountingCircuitBuilder::new(&iterate, 3)
        .build(&state_prep)
        .unwrap();
    let circuit = counting.circuit();

    assert_eq!(circuit.qreg("prec"), vec![QubitId(0), QubitId(1), QubitId(2)]);
    assert_eq!(circuit.qreg("state"), vec![QubitId(3)]);
    assert_eq!(circuit.qreg("target"), vec![QubitId(4)]);
    assert_eq!(circuit.num_clbits(), 3);
    assert_eq!(counting.precision_width(), 3);
    assert_eq!(counting.num_state_qubits(), 1);
    assert_eq!(counting.phase_offset(), 4);

    let ops = circuit.count_ops();
    assert_eq!(ops.get("grover"), Some(&3));
    assert_eq!(ops.get("measure"), Some(&3));
}

#[test]
fn precision_qubit_j_controls_two_to_the_j_powers() {
    let (iterate, state_prep) = setup(&[vec![1.0]]);
    let counting = CountingCircuitBuilder::new(&iterate, 4)
        .build(&state_prep)
        .unwrap();

    let powers: Vec<(QubitId, u32)> = counting
        .circuit()
        .instructions()
        .unwrap()
        .into_iter()
        .filter(|i| i.name() == "grover")
        .map(|i| {
            let gate = match i.as_gate().unwrap() {
                qtally_ir::Gate::Composite(g) => g.clone(),
                qtally_ir::Gate::Standard(g) => panic!("unexpected {g:?}"),
            };
            assert_eq!(gate.num_ctrl, 1);
            (i.qubits[0], gate.power)
        })
        .collect();

    assert_eq!(
        powers,
        vec![
            (QubitId(0), 1),
            (QubitId(1), 2),
            (QubitId(2), 4),
            (QubitId(3), 8)
        ]
    );
}

#[test]
fn measurements_map_prec_j_to_meas_j() {
    let (iterate, state_prep) = setup(&[vec![1.0]]);
    let counting = CountingCircuitBuilder::new(&iterate, 3)
        .build(&state_prep)
        .unwrap();
    for inst in counting.circuit().instructions().unwrap() {
        if inst.is_measure() {
            assert_eq!(inst.qubits[0].0, inst.clbits[0].0);
        }
    }
}

// ---------------------------------------------------------------------------
// Phase estimation
// ---------------------------------------------------------------------------

#[test]
fn all_marked_state_gives_raw_outcome_zero() {
    let (iterate, state_prep) = setup(&[vec![1.0]]);
    let counting = CountingCircuitBuilder::new(&iterate, 3)
        .build(&state_prep)
        .unwrap();
    let dist = outcome_distribution(counting.circuit(), 3);
    assert!((dist[0] - 1.0).abs() < 1e-9, "{dist:?}");
}

#[test]
fn nothing_marked_gives_raw_outcome_half() {
    let (iterate, state_prep) = setup(&[vec![0.0]]);
    let counting = CountingCircuitBuilder::new(&iterate, 3)
        .build(&state_prep)
        .unwrap();
    let dist = outcome_distribution(counting.circuit(), 3);
    assert!((dist[4] - 1.0).abs() < 1e-9, "{dist:?}");
}

#[test]
fn half_marked_peaks_symmetrically() {
    // a = 1/2: textbook eigenphases ±π/2, shifted by π
    let (iterate, state_prep) = setup(&[vec![0.0], vec![1.0]]);
    let counting = CountingCircuitBuilder::new(&iterate, 3)
        .build(&state_prep)
        .unwrap();
    let dist = outcome_distribution(counting.circuit(), 3);
    assert!((dist[2] - 0.5).abs() < 1e-9, "{dist:?}");
    assert!((dist[6] - 0.5).abs() < 1e-9, "{dist:?}");
}

#[test]
fn oracle_skipping_every_term_behaves_as_unmarked() {
    let terms = BTreeSet::from([qtally_synth::ConditionSet::new([
        qtally_synth::PathCondition::new("pixel_5", true),
    ])]);
    let map = FeatureIndexMap::from_names(["pixel_0"]).unwrap();
    let oracle = synthesize(&terms, &map).unwrap();
    let (_, state_prep) = encode(&[vec![1.0]], None).unwrap();
    let iterate = GroverIterate::compose(&oracle, &state_prep).unwrap();
    let counting = CountingCircuitBuilder::new(&iterate, 3)
        .build(&state_prep)
        .unwrap();
    let dist = outcome_distribution(counting.circuit(), 3);
    assert!((dist[4] - 1.0).abs() < 1e-9, "{dist:?}");
}
