/// CNOT direction flip.
///
///   CNOT(c,t) → H(c)·H(t)·CNOT(t,c)·H(t)·H(c)
///
/// A pure expansion: nothing is merged or cancelled here. It is meant to be
/// followed by a cleanup such as `CancelAdjacent::single_qubit()`.
///
/// `FlipSharedTarget` is the selective variant used by the merge-flip
/// pipeline. It flips only shared-target runs whose controls are each
/// bracketed by H on both sides:
///
///   H(c1)H(c2)·CNOT(c1,t)CNOT(c2,t)·H(c1)H(c2)
///
/// Flipping such a run lets every control bracket cancel against the flip's
/// own H, and turns the run into a shared-control run the merge rule can fold.
/// Bare runs are left alone, since flipping them only adds operations.
use std::collections::BTreeSet;

use tracing::trace;

use super::Rule;
use crate::circuit::{Circuit, CircuitBuilder, Gate, OpId, OpRef, Operation, Timelines, Wire};

/// The five-operation expansion of `CNOT(control, target)`.
pub fn flipped(control: Wire, target: Wire) -> [Operation; 5] {
    [
        Operation::h(control),
        Operation::h(target),
        Operation::cnot(target, control),
        Operation::h(target),
        Operation::h(control),
    ]
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlipTwoQubit {
    /// `None` flips every CNOT.
    only: Option<BTreeSet<OpRef>>,
}

impl FlipTwoQubit {
    pub fn new() -> Self {
        Self { only: None }
    }

    /// Flip only the CNOTs at the given circuit positions. Positions that do
    /// not hold a CNOT are ignored.
    pub fn selected(positions: BTreeSet<OpRef>) -> Self {
        Self { only: Some(positions) }
    }

    fn wants(&self, at: OpRef) -> bool {
        self.only.as_ref().map_or(true, |set| set.contains(&at))
    }
}

impl Rule for FlipTwoQubit {
    fn name(&self) -> &'static str {
        "flip-two-qubit"
    }

    fn rewrite(&self, circuit: &Circuit) -> Circuit {
        let mut out = CircuitBuilder::new();
        for (m, moment) in circuit.moments().iter().enumerate() {
            for (i, op) in moment.operations().iter().enumerate() {
                match op.as_cnot() {
                    Some((c, t)) if self.wants(OpRef { moment: m, index: i }) => {
                        trace!(control = c, target = t, "flipped cnot");
                        out.extend(flipped(c, t));
                    }
                    _ => out.push(op.clone()),
                }
            }
        }
        out.finish()
    }
}

/// Flip every CNOT taking part in a shared-target run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlipSharedTarget;

impl FlipSharedTarget {
    pub fn new() -> Self {
        Self
    }

    /// Positions of CNOTs in shared-target runs worth flipping.
    ///
    /// A run is a stretch of at least two CNOTs adjacent on their common
    /// target's timeline, with pairwise distinct controls, where every control
    /// has an H immediately before and after its CNOT on the control's timeline.
    pub fn candidates(circuit: &Circuit) -> BTreeSet<OpRef> {
        let lanes = Timelines::of(circuit);
        let mut found = BTreeSet::new();

        for wire in lanes.wires() {
            let mut run: Vec<(OpId, Wire)> = Vec::new();
            for &id in lanes.lane(wire) {
                let control = lanes
                    .op(id)
                    .as_cnot()
                    .filter(|(c, t)| *t == wire && bracketed(&lanes, *c, id))
                    .map(|(c, _)| c);
                match control {
                    Some(c) if run.iter().all(|(_, seen)| *seen != c) => run.push((id, c)),
                    Some(c) => {
                        close_run(&lanes, &mut run, &mut found);
                        run.push((id, c));
                    }
                    None => close_run(&lanes, &mut run, &mut found),
                }
            }
            close_run(&lanes, &mut run, &mut found);
        }
        found
    }
}

/// True if `id` has an H right before and right after it on `wire`.
fn bracketed(lanes: &Timelines, wire: Wire, id: OpId) -> bool {
    let lane = lanes.lane(wire);
    let is_h = |k: usize| lane.get(k).is_some_and(|op| lanes.op(*op).gate() == Gate::H);
    match lanes.position(wire, id) {
        Some(i) => i > 0 && is_h(i - 1) && is_h(i + 1),
        None => false,
    }
}

fn close_run(lanes: &Timelines, run: &mut Vec<(OpId, Wire)>, found: &mut BTreeSet<OpRef>) {
    if run.len() >= 2 {
        found.extend(run.iter().filter_map(|(id, _)| lanes.origin(*id)));
    }
    run.clear();
}

impl Rule for FlipSharedTarget {
    fn name(&self) -> &'static str {
        "flip-shared-target"
    }

    fn rewrite(&self, circuit: &Circuit) -> Circuit {
        let positions = Self::candidates(circuit);
        if positions.is_empty() {
            return circuit.clone();
        }
        FlipTwoQubit::selected(positions).rewrite(circuit)
    }
}
