/// State-vector simulator for finished circuits.
///
/// `Simulator` binds a wire layout (sorted wire ids → register slots) to a
/// state vector and runs whole `Circuit`s on it. It handles:
///   - Basis-state preparation
///   - Circuit execution, operation by operation in moment order
///   - Repeated full-register sampling with a seeded RNG
use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::gates::apply_gate;
use super::state::{StateVector, MAX_SLOTS};
use crate::circuit::{Circuit, Wire};

pub struct Simulator {
    pub state: StateVector,
    layout: Vec<Wire>,
    rng: StdRng,
}

impl Simulator {
    /// Simulator over `wires` (deduplicated and sorted), starting in `|0…0⟩`.
    ///
    /// Returns `None` for more than `MAX_SLOTS` wires.
    pub fn new<I: IntoIterator<Item = Wire>>(wires: I) -> Option<Self> {
        Self::with_seed(wires, 0)
    }

    /// Same as `new`, with a fixed seed for sampling.
    pub fn with_seed<I: IntoIterator<Item = Wire>>(wires: I, seed: u64) -> Option<Self> {
        let mut layout: Vec<Wire> = wires.into_iter().collect();
        layout.sort_unstable();
        layout.dedup();
        if layout.len() > MAX_SLOTS {
            return None;
        }
        Some(Self {
            state: StateVector::zero(layout.len()),
            layout,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn num_slots(&self) -> usize {
        self.layout.len()
    }

    pub fn slot_of(&self, wire: Wire) -> Option<usize> {
        self.layout.binary_search(&wire).ok()
    }

    /// Reset the register to `|index⟩`.
    pub fn prepare(&mut self, index: usize) -> &mut Self {
        self.state = StateVector::basis(self.layout.len(), index);
        self
    }

    /// Run every operation of `circuit`. Operations on wires outside the
    /// layout are skipped and reported as `false`.
    pub fn run(&mut self, circuit: &Circuit) -> bool {
        let mut complete = true;
        for op in circuit.operations() {
            let slots: Option<Vec<usize>> = op.wires().iter().map(|w| self.slot_of(*w)).collect();
            match slots {
                Some(slots) => apply_gate(&mut self.state, op.gate(), &slots),
                None => complete = false,
            }
        }
        complete
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.state.probabilities()
    }

    /// Draw `shots` full-register measurements from the current state without
    /// collapsing it. Keys are basis indices.
    pub fn sample(&mut self, shots: usize) -> BTreeMap<usize, usize> {
        let cumulative: Vec<f64> = self
            .probabilities()
            .into_iter()
            .scan(0.0, |acc, p| {
                *acc += p;
                Some(*acc)
            })
            .collect();
        let last = cumulative.len().saturating_sub(1);

        let mut counts = BTreeMap::new();
        for _ in 0..shots {
            let r: f64 = self.rng.gen::<f64>() * cumulative.last().copied().unwrap_or(1.0);
            let idx = cumulative.partition_point(|c| *c <= r).min(last);
            *counts.entry(idx).or_insert(0) += 1;
        }
        counts
    }
}
