/// Hadamard-sandwich collapse.
///
///   H(c)·H(t)·CNOT(c,t)·H(t)·H(c) → CNOT(t,c)
///
/// Works on per-wire timelines. Wires whose timeline does not even contain
/// H, CNOT, H as a subsequence are ruled out up front. A CNOT(c,t) then
/// collapses only when, on *both* wires, its immediate timeline neighbours
/// are an H before and an H after, and none of those five operations was
/// already consumed by an earlier match. Matches are taken first-found in
/// scan order.
///
/// Lanes are rebuilt by copying around each matched window (the H before,
/// the CNOT, the H after) with the reversed CNOT in the CNOT's place, then
/// re-linearized into moments.
use std::collections::{BTreeSet, HashMap};

use tracing::trace;

use super::matchers::is_subsequence;
use super::Rule;
use crate::circuit::{Circuit, Gate, OpId, Operation, Timelines, Wire};

const HCH: [Gate; 3] = [Gate::H, Gate::Cnot, Gate::H];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CancelSandwich;

impl CancelSandwich {
    pub fn new() -> Self {
        Self
    }
}

/// One collapsible window on one wire: `[before, cnot, after]`.
fn window(lanes: &Timelines, wire: Wire, cnot: OpId) -> Option<[OpId; 3]> {
    let lane = lanes.lane(wire);
    let i = lanes.position(wire, cnot)?;
    if i == 0 || i + 1 >= lane.len() {
        return None;
    }
    let (before, after) = (lane[i - 1], lane[i + 1]);
    let is_h = |id: OpId| lanes.op(id).gate() == Gate::H;
    (is_h(before) && is_h(after)).then_some([before, cnot, after])
}

impl Rule for CancelSandwich {
    fn name(&self) -> &'static str {
        "cancel-sandwich"
    }

    fn rewrite(&self, circuit: &Circuit) -> Circuit {
        let mut lanes = Timelines::of(circuit);

        let eligible: BTreeSet<Wire> = lanes
            .wires()
            .filter(|w| is_subsequence(&HCH, lanes.lane_ops(*w)))
            .collect();
        if eligible.is_empty() {
            return circuit.clone();
        }

        let mut consumed: BTreeSet<OpId> = BTreeSet::new();
        let mut collapses: Vec<(OpId, Wire, Wire)> = Vec::new();
        let ids: Vec<OpId> = lanes.ids().collect();

        for id in ids {
            let Some((c, t)) = lanes.op(id).as_cnot() else { continue };
            if !eligible.contains(&c) || !eligible.contains(&t) || consumed.contains(&id) {
                continue;
            }
            let (Some(on_c), Some(on_t)) = (window(&lanes, c, id), window(&lanes, t, id)) else {
                continue;
            };
            if on_c.iter().chain(on_t.iter()).any(|x| consumed.contains(x)) {
                continue;
            }
            consumed.extend(on_c);
            consumed.extend(on_t);
            collapses.push((id, c, t));
        }

        if collapses.is_empty() {
            return circuit.clone();
        }

        let mut replacement: HashMap<OpId, OpId> = HashMap::new();
        for (id, c, t) in collapses {
            trace!(control = c, target = t, "collapsed hadamard sandwich");
            let reversed = lanes.add(Operation::cnot(t, c));
            replacement.insert(id, reversed);
        }

        lanes.rebuild_lanes(|_, id| {
            if let Some(new) = replacement.get(&id) {
                Some(*new)
            } else if consumed.contains(&id) {
                None
            } else {
                Some(id)
            }
        });
        lanes.relinearize()
    }
}
