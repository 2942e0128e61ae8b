/// Gate matrices and their application to a state vector.
///
/// Single-operand gates are 2×2 complex matrices applied to amplitude pairs
/// that differ only in the target slot, O(2^n) per gate. Two-operand and
/// composite gates are applied as permutations / phase flips of basis states.
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

use super::complex::Complex;
use super::state::StateVector;
use crate::circuit::Gate;

/// Row-major 2×2 complex matrix.
pub type Matrix2x2 = [[Complex; 2]; 2];

// ── Single-operand matrices ────────────────────────────────────────────────

/// H = (1/√2)·[[1, 1], [1, -1]]
pub fn hadamard() -> Matrix2x2 {
    let h = Complex::new(FRAC_1_SQRT_2, 0.0);
    [[h, h], [h, -h]]
}

pub fn pauli_x() -> Matrix2x2 {
    [[Complex::ZERO, Complex::ONE], [Complex::ONE, Complex::ZERO]]
}

/// Y = [[0, -i], [i, 0]]
pub fn pauli_y() -> Matrix2x2 {
    [[Complex::ZERO, -Complex::I], [Complex::I, Complex::ZERO]]
}

pub fn pauli_z() -> Matrix2x2 {
    [[Complex::ONE, Complex::ZERO], [Complex::ZERO, -Complex::ONE]]
}

/// S = diag(1, i)
pub fn s_gate() -> Matrix2x2 {
    [[Complex::ONE, Complex::ZERO], [Complex::ZERO, Complex::I]]
}

/// T = diag(1, e^(iπ/4))
pub fn t_gate() -> Matrix2x2 {
    [[Complex::ONE, Complex::ZERO], [Complex::ZERO, Complex::cis(FRAC_PI_4)]]
}

/// Matrix of a single-operand gate; `None` for multi-operand gates.
pub fn single_matrix(gate: Gate) -> Option<Matrix2x2> {
    match gate {
        Gate::X => Some(pauli_x()),
        Gate::Y => Some(pauli_y()),
        Gate::Z => Some(pauli_z()),
        Gate::H => Some(hadamard()),
        Gate::S => Some(s_gate()),
        Gate::T => Some(t_gate()),
        Gate::Cz | Gate::Cnot | Gate::Swap | Gate::ISwap
        | Gate::XX | Gate::YY | Gate::ZZ | Gate::Cxx | Gate::Cxxx => None,
    }
}

// ── Application ────────────────────────────────────────────────────────────

pub fn apply_single(state: &mut StateVector, m: &Matrix2x2, slot: usize) {
    assert!(slot < state.num_slots, "slot {slot} out of range");
    let mask = 1usize << slot;
    for i in 0..state.dim() {
        if i & mask != 0 {
            continue;
        }
        let j = i | mask;
        let (a0, a1) = (state.amplitudes[i], state.amplitudes[j]);
        state.amplitudes[i] = m[0][0] * a0 + m[0][1] * a1;
        state.amplitudes[j] = m[1][0] * a0 + m[1][1] * a1;
    }
}

/// Flip `target` where `control` is set.
pub fn apply_cnot(state: &mut StateVector, control: usize, target: usize) {
    assert_ne!(control, target, "control and target must be different slots");
    let (cm, tm) = (1usize << control, 1usize << target);
    for i in 0..state.dim() {
        if i & cm != 0 && i & tm == 0 {
            state.amplitudes.swap(i, i | tm);
        }
    }
}

/// Phase flip on `|11⟩`.
pub fn apply_cz(state: &mut StateVector, a: usize, b: usize) {
    assert_ne!(a, b, "CZ requires two different slots");
    let mask = (1usize << a) | (1usize << b);
    for i in 0..state.dim() {
        if i & mask == mask {
            state.amplitudes[i] = -state.amplitudes[i];
        }
    }
}

/// Exchange slots `a` and `b`; with `phase = i` this is ISWAP.
fn apply_exchange(state: &mut StateVector, a: usize, b: usize, phase: Complex) {
    assert_ne!(a, b, "exchange requires two different slots");
    let (am, bm) = (1usize << a, 1usize << b);
    for i in 0..state.dim() {
        if i & am != 0 && i & bm == 0 {
            let j = (i & !am) | bm;
            let (x, y) = (state.amplitudes[i], state.amplitudes[j]);
            state.amplitudes[i] = phase * y;
            state.amplitudes[j] = phase * x;
        }
    }
}

pub fn apply_swap(state: &mut StateVector, a: usize, b: usize) {
    apply_exchange(state, a, b, Complex::ONE);
}

/// |01⟩ → i|10⟩, |10⟩ → i|01⟩
pub fn apply_iswap(state: &mut StateVector, a: usize, b: usize) {
    apply_exchange(state, a, b, Complex::I);
}

/// Apply `gate` to the given register slots (operand order as in the operation).
pub fn apply_gate(state: &mut StateVector, gate: Gate, slots: &[usize]) {
    assert_eq!(slots.len(), gate.arity(), "{gate} applied to {} slots", slots.len());
    match gate {
        Gate::X | Gate::Y | Gate::Z | Gate::H | Gate::S | Gate::T => {
            if let Some(m) = single_matrix(gate) {
                apply_single(state, &m, slots[0]);
            }
        }
        Gate::Cnot => apply_cnot(state, slots[0], slots[1]),
        Gate::Cz => apply_cz(state, slots[0], slots[1]),
        Gate::Swap => apply_swap(state, slots[0], slots[1]),
        Gate::ISwap => apply_iswap(state, slots[0], slots[1]),
        Gate::XX | Gate::YY | Gate::ZZ => {
            let m = match gate {
                Gate::XX => pauli_x(),
                Gate::YY => pauli_y(),
                _ => pauli_z(),
            };
            apply_single(state, &m, slots[0]);
            apply_single(state, &m, slots[1]);
        }
        Gate::Cxx | Gate::Cxxx => {
            for &t in &slots[1..] {
                apply_cnot(state, slots[0], t);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(state: &StateVector, i: usize) -> f64 {
        state.amplitudes[i].norm_sq()
    }

    #[test]
    fn test_x_flips_slot() {
        let mut s = StateVector::zero(1);
        apply_gate(&mut s, Gate::X, &[0]);
        assert!((p(&s, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hh_is_identity() {
        let mut s = StateVector::basis(2, 2);
        apply_gate(&mut s, Gate::H, &[1]);
        apply_gate(&mut s, Gate::H, &[1]);
        assert_eq!(s, StateVector::basis(2, 2));
    }

    #[test]
    fn test_cnot_respects_operand_order() {
        // |01⟩: slot 0 set.
        let mut s = StateVector::basis(2, 1);
        apply_gate(&mut s, Gate::Cnot, &[0, 1]);
        assert_eq!(s, StateVector::basis(2, 3));
        let mut r = StateVector::basis(2, 1);
        apply_gate(&mut r, Gate::Cnot, &[1, 0]);
        assert_eq!(r, StateVector::basis(2, 1));
    }

    #[test]
    fn test_iswap_phase() {
        let mut s = StateVector::basis(2, 1);
        apply_gate(&mut s, Gate::ISwap, &[0, 1]);
        assert_eq!(s.amplitudes[2], Complex::I);
    }

    #[test]
    fn test_swap_exchanges() {
        let mut s = StateVector::basis(3, 0b001);
        apply_gate(&mut s, Gate::Swap, &[0, 2]);
        assert_eq!(s, StateVector::basis(3, 0b100));
    }

    #[test]
    fn test_zz_phase() {
        let mut s = StateVector::basis(2, 1);
        apply_gate(&mut s, Gate::ZZ, &[0, 1]);
        assert_eq!(s.amplitudes[1], -Complex::ONE);
    }

    #[test]
    fn test_cxx_is_two_cnots() {
        let mut a = StateVector::basis(3, 1);
        apply_gate(&mut a, Gate::Cxx, &[0, 1, 2]);
        assert_eq!(a, StateVector::basis(3, 0b111));
    }

    #[test]
    fn test_cz_phase_flip() {
        let mut s = StateVector::basis(2, 3);
        apply_gate(&mut s, Gate::Cz, &[1, 0]);
        assert_eq!(s.amplitudes[3], -Complex::ONE);
    }

    #[test]
    fn test_t_squared_is_s() {
        let mut a = StateVector::basis(1, 1);
        apply_gate(&mut a, Gate::T, &[0]);
        apply_gate(&mut a, Gate::T, &[0]);
        let mut b = StateVector::basis(1, 1);
        apply_gate(&mut b, Gate::S, &[0]);
        assert_eq!(a, b);
    }
}
