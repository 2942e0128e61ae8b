/// State vector over a small register.
///
/// An n-wire register has 2^n basis states; bit `k` of a basis index is the
/// value of register slot `k` (slot 0 is the least-significant bit).
use std::fmt;

use super::complex::{Complex, EPSILON};

/// Registers above this size are refused by the simulator.
pub const MAX_SLOTS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    pub num_slots: usize,
    pub amplitudes: Vec<Complex>,
}

impl StateVector {
    /// The basis state `|index⟩` on `num_slots` slots.
    pub fn basis(num_slots: usize, index: usize) -> Self {
        assert!(num_slots <= MAX_SLOTS, "register of {num_slots} slots is too large");
        let dim = 1usize << num_slots;
        assert!(index < dim, "basis index {index} out of range for {num_slots} slots");
        let mut amplitudes = vec![Complex::ZERO; dim];
        amplitudes[index] = Complex::ONE;
        Self { num_slots, amplitudes }
    }

    /// `|0…0⟩`
    pub fn zero(num_slots: usize) -> Self {
        Self::basis(num_slots, 0)
    }

    #[inline(always)]
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    #[inline(always)]
    pub fn bit(index: usize, slot: usize) -> bool {
        (index >> slot) & 1 == 1
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sq()).collect()
    }

    pub fn total_probability(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sq()).sum()
    }

    /// ⟨self|other⟩
    pub fn inner(&self, other: &StateVector) -> Complex {
        self.amplitudes
            .iter()
            .zip(&other.amplitudes)
            .fold(Complex::ZERO, |acc, (a, b)| acc + a.conj() * *b)
    }

    /// Index of the largest-magnitude amplitude.
    pub fn dominant_index(&self) -> usize {
        let mut best = 0;
        for (i, a) in self.amplitudes.iter().enumerate() {
            if a.norm_sq() > self.amplitudes[best].norm_sq() + EPSILON {
                best = i;
            }
        }
        best
    }

    /// True if `other == phase · self` amplitude by amplitude.
    pub fn matches_with_phase(&self, other: &StateVector, phase: Complex, eps: f64) -> bool {
        self.dim() == other.dim()
            && self
                .amplitudes
                .iter()
                .zip(&other.amplitudes)
                .all(|(a, b)| (*a * phase).approx_eq(*b, eps))
    }

    /// Ket label with slot 0 rightmost.
    pub fn basis_label(&self, index: usize) -> String {
        (0..self.num_slots)
            .rev()
            .map(|s| if Self::bit(index, s) { '1' } else { '0' })
            .collect()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "StateVector ({} slots, dim={}):", self.num_slots, self.dim())?;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            let prob = amp.norm_sq();
            if prob > 1e-12 {
                writeln!(f, "  |{}⟩  {}  p={:.4}", self.basis_label(i), amp, prob)?;
            }
        }
        Ok(())
    }
}
