//! Statevector simulation engine.

use num_complex::Complex64;
use rand::Rng;

use ftdemo_ir::{Instruction, InstructionKind, StandardGate};

/// A statevector over `n` qubits; bit `q` of a basis index is qubit `q`.
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Apply an instruction. Measurements are handled by the caller.
    pub fn apply(&mut self, instruction: &Instruction) {
        let InstructionKind::Gate(gate) = instruction.kind else {
            return;
        };
        let q: Vec<usize> = instruction.qubits.iter().map(|q| q.0 as usize).collect();
        match gate {
            StandardGate::H => self.apply_h(q[0]),
            StandardGate::X => self.apply_x(q[0]),
            StandardGate::Z => self.apply_z(q[0]),
            StandardGate::S => self.apply_s(q[0]),
            StandardGate::CX => self.apply_cx(q[0], q[1]),
        }
    }

    /// Apply Pauli-X to a qubit.
    pub fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_z(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp = -*amp;
            }
        }
    }

    fn apply_s(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp *= Complex64::i();
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    /// Probability of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Sample a basis state.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        sample_index(&self.probabilities(), rng)
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }
}

/// Draw an index from a discrete distribution.
pub fn sample_index<R: Rng + ?Sized>(probabilities: &[f64], rng: &mut R) -> usize {
    let r: f64 = rng.r#gen();
    let mut cumulative = 0.0;
    for (i, p) in probabilities.iter().enumerate() {
        cumulative += p;
        if r < cumulative {
            return i;
        }
    }
    // rounding can leave the total just below 1
    probabilities.len().saturating_sub(1)
}
