/// Before/after comparison of a rewrite.
///
/// Counts and depths are always reported. Semantic equivalence is checked
/// exactly by running both circuits on every basis input of their joint wire
/// register and comparing the outputs up to one global phase; this is only
/// attempted for registers of at most `max_wires` wires. With sampling
/// enabled the measured output distributions are compared as well.
use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, warn};

use crate::circuit::{analyze, Circuit, Wire};
use crate::core::complex::Complex;
use crate::core::Simulator;

/// Default register-size limit for the exact check.
pub const MAX_EXACT_WIRES: usize = 8;

const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub ops_before: usize,
    pub ops_after: usize,
    pub depth_before: usize,
    pub depth_after: usize,
    /// `None` when the register was too large to check.
    pub equivalent: Option<bool>,
    /// Total variation distance of sampled outputs, when sampling is enabled.
    pub distance: Option<f64>,
}

impl ComparisonResult {
    pub fn reduced(&self) -> bool {
        self.ops_after < self.ops_before
    }

    pub fn ops_removed(&self) -> usize {
        self.ops_before.saturating_sub(self.ops_after)
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let eq = match self.equivalent {
            Some(true) => "equivalent",
            Some(false) => "NOT equivalent",
            None => "unchecked",
        };
        write!(
            f,
            "ops {} -> {}, depth {} -> {}, {eq}",
            self.ops_before, self.ops_after, self.depth_before, self.depth_after
        )?;
        if let Some(d) = self.distance {
            write!(f, ", tvd {d:.4}")?;
        }
        Ok(())
    }
}

/// State-vector verifier.
#[derive(Debug, Clone)]
pub struct Verifier {
    max_wires: usize,
    sampling: Option<(usize, u64)>,
}

impl Default for Verifier {
    fn default() -> Self {
        Self { max_wires: MAX_EXACT_WIRES, sampling: None }
    }
}

impl Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_wires(mut self, max_wires: usize) -> Self {
        self.max_wires = max_wires;
        self
    }

    /// Also compare `shots` measured samples of both circuits.
    pub fn with_sampling(mut self, shots: usize, seed: u64) -> Self {
        self.sampling = Some((shots, seed));
        self
    }

    pub fn verify(&self, original: &Circuit, rewritten: &Circuit) -> ComparisonResult {
        let (before, after) = (analyze(original), analyze(rewritten));
        let result = ComparisonResult {
            ops_before: before.operation_count,
            ops_after: after.operation_count,
            depth_before: before.depth,
            depth_after: after.depth,
            equivalent: self.equivalent(original, rewritten),
            distance: self
                .sampling
                .and_then(|(shots, seed)| sample_distance(original, rewritten, shots, seed)),
        };
        debug!(%result, "verified rewrite");
        result
    }

    /// Exact unitary comparison up to global phase.
    pub fn equivalent(&self, original: &Circuit, rewritten: &Circuit) -> Option<bool> {
        let wires = joint_wires(original, rewritten);
        if wires.len() > self.max_wires {
            debug!(wires = wires.len(), limit = self.max_wires, "register too large for exact check");
            return None;
        }
        let mut a = Simulator::new(wires.iter().copied())?;
        let mut b = Simulator::new(wires.iter().copied())?;

        let mut phase: Option<Complex> = None;
        for input in 0..1usize << wires.len() {
            a.prepare(input).run(original);
            b.prepare(input).run(rewritten);
            let global = *phase.get_or_insert_with(|| {
                let j = a.state.dominant_index();
                b.state.amplitudes[j] / a.state.amplitudes[j]
            });
            if !a.state.matches_with_phase(&b.state, global, TOLERANCE) {
                warn!(input, "rewrite changed the output state");
                return Some(false);
            }
        }
        Some(true)
    }
}

fn joint_wires(a: &Circuit, b: &Circuit) -> BTreeSet<Wire> {
    a.wires().union(&b.wires()).copied().collect()
}

/// `Verifier::default().verify(original, rewritten)`.
pub fn verify(original: &Circuit, rewritten: &Circuit) -> ComparisonResult {
    Verifier::default().verify(original, rewritten)
}

/// Total variation distance between the measured output distributions of
/// both circuits on `|0…0⟩`, estimated from `shots` samples each.
///
/// `None` if the joint register exceeds the simulator's capacity.
pub fn sample_distance(original: &Circuit, rewritten: &Circuit, shots: usize, seed: u64) -> Option<f64> {
    if shots == 0 {
        return Some(0.0);
    }
    let wires = joint_wires(original, rewritten);
    let mut a = Simulator::with_seed(wires.iter().copied(), seed)?;
    let mut b = Simulator::with_seed(wires.iter().copied(), seed.wrapping_add(1))?;
    a.run(original);
    b.run(rewritten);
    let (ca, cb) = (a.sample(shots), b.sample(shots));

    let outcomes: BTreeSet<usize> = ca.keys().chain(cb.keys()).copied().collect();
    let total: usize = outcomes
        .iter()
        .map(|k| ca.get(k).copied().unwrap_or(0).abs_diff(cb.get(k).copied().unwrap_or(0)))
        .sum();
    Some(total as f64 / (2 * shots) as f64)
}
