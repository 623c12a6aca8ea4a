//! Statevector simulation engine.
//!
//! Every kernel takes a control mask: the operation only touches basis
//! states whose bits under the mask are all set. Controlled and composite
//! gates reduce to the same kernels with a wider mask.

use num_complex::Complex64;
use rand::Rng;
use std::f64::consts::FRAC_1_SQRT_2;

use qtally_hal::{HalError, HalResult};
use qtally_ir::{CompositeGate, Gate, Instruction, InstructionKind, StandardGate};

type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// A statevector over `num_qubits` qubits, qubit 0 the least significant bit.
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![ZERO; size];
        amplitudes[0] = ONE;
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Apply an instruction to the statevector.
    ///
    /// Measurements and barriers leave the state untouched; the caller
    /// samples the final state. Reset is not supported.
    pub fn apply(&mut self, instruction: &Instruction) -> HalResult<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits: Vec<_> = instruction.qubits.iter().map(|q| q.index()).collect();
                self.check_operands(&qubits)?;
                self.apply_gate(gate, &qubits, 0)
            }
            InstructionKind::Measure | InstructionKind::Barrier => Ok(()),
            InstructionKind::Reset => Err(HalError::InvalidCircuit(
                "reset is not supported by the statevector simulator".into(),
            )),
        }
    }

    fn check_operands(&self, qubits: &[usize]) -> HalResult<()> {
        match qubits.iter().find(|&&q| q >= self.num_qubits) {
            Some(q) => Err(HalError::InvalidCircuit(format!(
                "qubit {q} out of range for {} qubit state",
                self.num_qubits
            ))),
            None => Ok(()),
        }
    }

    fn apply_gate(&mut self, gate: &Gate, qubits: &[usize], ctrl: usize) -> HalResult<()> {
        match gate {
            Gate::Standard(g) => {
                self.apply_standard_gate(g, qubits, ctrl);
                Ok(())
            }
            Gate::Composite(g) => self.apply_composite(g, qubits, ctrl),
        }
    }

    /// Apply a standard gate under the extra control mask `ctrl`. Leading
    /// control operands join the mask; the rest are the gate's targets.
    fn apply_standard_gate(&mut self, gate: &StandardGate, qubits: &[usize], ctrl: usize) {
        let (controls, targets) = qubits.split_at(gate.num_controls() as usize);
        let mask = controls.iter().fold(ctrl, |m, &q| m | bit(q));
        match gate {
            StandardGate::X | StandardGate::CX | StandardGate::MCX(_) => {
                self.apply_x(targets[0], mask);
            }
            StandardGate::H => {
                let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
                self.apply_matrix(targets[0], mask, [[h, h], [h, -h]]);
            }
            StandardGate::Ry(theta) | StandardGate::CRy(theta) => {
                self.apply_matrix(targets[0], mask, ry_matrix(*theta));
            }
            StandardGate::P(theta) | StandardGate::CP(theta) => {
                self.apply_phase(targets[0], mask, *theta);
            }
            StandardGate::Swap => self.apply_swap(targets[0], targets[1], mask),
        }
    }

    /// Apply a composite gate: controls widen the mask, the body is mapped
    /// onto the remaining operands and repeated `power` times.
    fn apply_composite(
        &mut self,
        gate: &CompositeGate,
        qubits: &[usize],
        ctrl: usize,
    ) -> HalResult<()> {
        let (controls, targets) = qubits.split_at(gate.num_ctrl as usize);
        let ctrl = controls.iter().fold(ctrl, |m, &q| m | bit(q));

        let mut body = Vec::with_capacity(gate.body.len());
        for inst in &gate.body {
            let InstructionKind::Gate(g) = &inst.kind else {
                if inst.is_directive() {
                    continue;
                }
                return Err(HalError::InvalidCircuit(format!(
                    "'{}' inside composite gate '{}'",
                    inst.name(),
                    gate.name
                )));
            };
            let mapped = inst
                .qubits
                .iter()
                .map(|q| {
                    targets.get(q.index()).copied().ok_or_else(|| {
                        HalError::InvalidCircuit(format!(
                            "composite gate '{}' addresses local qubit {} of {}",
                            gate.name,
                            q.index(),
                            targets.len()
                        ))
                    })
                })
                .collect::<HalResult<Vec<_>>>()?;
            body.push((g, mapped));
        }

        for _ in 0..gate.power {
            for (inner, mapped) in &body {
                self.apply_gate(inner, mapped, ctrl)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Kernels
    // =========================================================================

    fn apply_x(&mut self, target: usize, ctrl: usize) {
        let tgt = bit(target);
        for i in 0..self.amplitudes.len() {
            if i & tgt == 0 && i & ctrl == ctrl {
                self.amplitudes.swap(i, i | tgt);
            }
        }
    }

    fn apply_matrix(&mut self, target: usize, ctrl: usize, m: Matrix2) {
        let tgt = bit(target);
        for i in 0..self.amplitudes.len() {
            if i & tgt == 0 && i & ctrl == ctrl {
                let j = i | tgt;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_diag(&mut self, target: usize, ctrl: usize, d0: Complex64, d1: Complex64) {
        let tgt = bit(target);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & ctrl == ctrl {
                *amp *= if i & tgt == 0 { d0 } else { d1 };
            }
        }
    }

    fn apply_phase(&mut self, target: usize, ctrl: usize, theta: f64) {
        self.apply_diag(target, ctrl, ONE, Complex64::from_polar(1.0, theta));
    }

    fn apply_swap(&mut self, q1: usize, q2: usize, ctrl: usize) {
        let mask1 = bit(q1);
        let mask2 = bit(q2);
        for i in 0..self.amplitudes.len() {
            if i & mask1 != 0 && i & mask2 == 0 && i & ctrl == ctrl {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    // =========================================================================
    // Sampling
    // =========================================================================

    /// Probability of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Draw `shots` basis-state indices from the final distribution.
    pub fn sample<R: Rng + ?Sized>(&self, shots: u32, rng: &mut R) -> Vec<usize> {
        let mut cumulative = Vec::with_capacity(self.amplitudes.len());
        let mut acc = 0.0;
        for p in self.probabilities() {
            acc += p;
            cumulative.push(acc);
        }
        let last = cumulative.len() - 1;

        (0..shots)
            .map(|_| {
                let r: f64 = rng.r#gen::<f64>() * acc;
                cumulative.partition_point(|&c| c <= r).min(last)
            })
            .collect()
    }
}

#[inline]
fn bit(qubit: usize) -> usize {
    1 << qubit
}

fn ry_matrix(theta: f64) -> Matrix2 {
    let c = Complex64::new((theta / 2.0).cos(), 0.0);
    let s = Complex64::new((theta / 2.0).sin(), 0.0);
    [[c, -s], [s, c]]
}
