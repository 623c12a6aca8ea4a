//! Tests for Grover iterate composition.

use std::collections::BTreeSet;

use num_complex::Complex64;
use qtally_adapter_sim::Statevector;
use qtally_ir::{Circuit, CompositeGate, QubitId};
use qtally_synth::encode::encode;
use qtally_synth::extract::{ConditionSet, PathCondition};
use qtally_synth::features::FeatureIndexMap;
use qtally_synth::oracle::synthesize;
use qtally_synth::{GroverIterate, SynthError};

fn run(circuit: &Circuit) -> Vec<Complex64> {
    let mut sv = Statevector::new(circuit.num_qubits());
    for inst in circuit.instructions().unwrap() {
        sv.apply(inst).unwrap();
    }
    sv.amplitudes().to_vec()
}

fn assert_states_close(a: &[Complex64], b: &[Complex64]) {
    assert_eq!(a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        assert!((x - y).norm() < 1e-9, "index {i}: {x} != {y}");
    }
}

/// Oracle marking `pixel_0 == 1` and a state preparation for `data`.
fn pixel_zero_setup(data: &[Vec<f64>]) -> (Circuit, Circuit) {
    let terms = BTreeSet::from([ConditionSet::new([PathCondition::new("pixel_0", true)])]);
    let map = FeatureIndexMap::from_names(["pixel_0"]).unwrap();
    let oracle = synthesize(&terms, &map).unwrap();
    let (_, state_prep) = encode(data, None).unwrap();
    (oracle, state_prep)
}

/// State prep on the state register with the flag in |−⟩.
fn prepared(state_prep: &Circuit) -> Circuit {
    let n = state_prep.num_qubits() as u32;
    let mut circuit = Circuit::with_size("prepared", n + 1, 0);
    let state: Vec<QubitId> = (0..n).map(QubitId).collect();
    circuit.compose(state_prep, &state).unwrap();
    circuit.x(QubitId(n)).unwrap().h(QubitId(n)).unwrap();
    circuit
}

fn with_gate(mut circuit: Circuit, gate: CompositeGate) -> Circuit {
    let qubits: Vec<QubitId> = (0..gate.total_qubits()).map(QubitId).collect();
    circuit.gate(gate, qubits).unwrap();
    circuit
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

#[test]
fn width_mismatch_is_rejected() {
    let (oracle, _) = pixel_zero_setup(&[vec![1.0]]);
    let (_, wide_prep) = encode(&[vec![1.0, 0.0]], None).unwrap();
    assert!(matches!(
        GroverIterate::compose(&oracle, &wide_prep),
        Err(SynthError::WidthMismatch {
            oracle: 2,
            state_prep: 2
        })
    ));
}

#[test]
fn iterate_is_one_opaque_gate() {
    let (oracle, state_prep) = pixel_zero_setup(&[vec![1.0]]);
    let iterate = GroverIterate::compose(&oracle, &state_prep).unwrap();
    assert_eq!(iterate.num_qubits(), 2);
    assert_eq!(iterate.num_state_qubits(), 1);
    assert_eq!(iterate.gate().num_qubits, 2);
    assert_eq!(iterate.gate().name, "grover");
    assert_eq!(iterate.power(4).power, 4);
    assert_eq!(iterate.controlled_power(2).num_ctrl, 1);
}

#[test]
fn oracle_with_measurement_is_rejected() {
    let (mut oracle, state_prep) = pixel_zero_setup(&[vec![1.0]]);
    let c = oracle.add_clbit();
    oracle.measure(QubitId(1), c).unwrap();
    assert!(matches!(
        GroverIterate::compose(&oracle, &state_prep),
        Err(SynthError::Ir(_))
    ));
}

// ---------------------------------------------------------------------------
// Diffuser
// ---------------------------------------------------------------------------

#[test]
fn diffuser_negates_prepared_state() {
    let (_, state_prep) = encode(&[vec![0.0, 1.0], vec![1.0, 1.0], vec![1.0, 0.0]], None).unwrap();
    let diffuser = GroverIterate::diffuser(&state_prep).unwrap();

    let before = run(&prepared(&state_prep));
    let mut after_circuit = prepared(&state_prep);
    after_circuit
        .compose(&diffuser, &[QubitId(0), QubitId(1), QubitId(2)])
        .unwrap();
    let after = run(&after_circuit);

    let negated: Vec<_> = before.iter().map(|a| -a).collect();
    assert_states_close(&after, &negated);
}

#[test]
fn diffuser_fixes_orthogonal_state() {
    // state prep gives |+⟩; |−⟩ on the state qubit is orthogonal to it
    let (_, state_prep) = encode(&[vec![0.0], vec![1.0]], None).unwrap();
    let diffuser = GroverIterate::diffuser(&state_prep).unwrap();

    let mut circuit = Circuit::with_size("orthogonal", 2, 0);
    circuit.x(QubitId(0)).unwrap().h(QubitId(0)).unwrap();
    circuit.x(QubitId(1)).unwrap().h(QubitId(1)).unwrap();
    let before = run(&circuit);
    circuit.compose(&diffuser, &[QubitId(0), QubitId(1)]).unwrap();
    assert_states_close(&run(&circuit), &before);
}

// ---------------------------------------------------------------------------
// Powers
// ---------------------------------------------------------------------------

#[test]
fn all_marked_state_is_fixed_by_iterate() {
    // oracle and diffuser each contribute −1
    let (oracle, state_prep) = pixel_zero_setup(&[vec![1.0]]);
    let iterate = GroverIterate::compose(&oracle, &state_prep).unwrap();

    let before = run(&prepared(&state_prep));
    let after = run(&with_gate(prepared(&state_prep), iterate.gate().clone()));
    assert_states_close(&after, &before);
}

#[test]
fn unmarked_state_is_negated_by_iterate() {
    let (oracle, state_prep) = pixel_zero_setup(&[vec![0.0]]);
    let iterate = GroverIterate::compose(&oracle, &state_prep).unwrap();

    let before = run(&prepared(&state_prep));
    let after = run(&with_gate(prepared(&state_prep), iterate.gate().clone()));
    let negated: Vec<_> = before.iter().map(|a| -a).collect();
    assert_states_close(&after, &negated);
}

#[test]
fn power_zero_is_identity() {
    let (oracle, state_prep) = pixel_zero_setup(&[vec![0.0], vec![1.0], vec![1.0]]);
    let iterate = GroverIterate::compose(&oracle, &state_prep).unwrap();

    let before = run(&prepared(&state_prep));
    let after = run(&with_gate(prepared(&state_prep), iterate.power(0)));
    assert_states_close(&after, &before);
}

#[test]
fn power_equals_repeated_application() {
    let (oracle, state_prep) = pixel_zero_setup(&[vec![0.0], vec![1.0], vec![1.0]]);
    let iterate = GroverIterate::compose(&oracle, &state_prep).unwrap();

    let powered = run(&with_gate(prepared(&state_prep), iterate.power(3)));

    let mut repeated = prepared(&state_prep);
    for _ in 0..3 {
        repeated = with_gate(repeated, iterate.gate().clone());
    }
    assert_states_close(&powered, &run(&repeated));
}

#[test]
fn controlled_power_respects_control() {
    let (oracle, state_prep) = pixel_zero_setup(&[vec![0.0], vec![1.0], vec![1.0]]);
    let iterate = GroverIterate::compose(&oracle, &state_prep).unwrap();

    // qubit 0 is the control, qubits 1..3 carry state and flag
    let build = |control_on: bool| {
        let mut circuit = Circuit::with_size("ctrl", 3, 0);
        if control_on {
            circuit.x(QubitId(0)).unwrap();
        }
        circuit.compose(&state_prep, &[QubitId(1)]).unwrap();
        circuit.x(QubitId(2)).unwrap().h(QubitId(2)).unwrap();
        circuit
    };

    let off_before = run(&build(false));
    let off_after = run(&with_gate(build(false), iterate.controlled_power(2)));
    assert_states_close(&off_after, &off_before);

    let mut uncontrolled = build(true);
    uncontrolled
        .gate(iterate.power(2), [QubitId(1), QubitId(2)])
        .unwrap();
    let on_after = run(&with_gate(build(true), iterate.controlled_power(2)));
    assert_states_close(&on_after, &run(&uncontrolled));
}
