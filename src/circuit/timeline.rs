/// Per-wire timelines over a shared operation arena.
///
/// Rules that need to look *around* an operation on several wires at once
/// (the sandwich collapse, the shared-target selection) work on this view
/// instead of on moments. Each operation is stored once in the arena; every
/// wire's lane holds `OpId`s into it. Lanes are rebuilt, never edited in
/// place, and `relinearize` turns a set of lanes back into moments.
use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use super::ir::{Circuit, Moment, Operation, Wire};

/// Index of an operation in a `Timelines` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub usize);

/// Position of an operation in a circuit: `(moment index, index within moment)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpRef {
    pub moment: usize,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct Timelines {
    ops: Vec<Operation>,
    /// Circuit position of each arena entry; `None` for operations added after
    /// construction.
    origins: Vec<Option<OpRef>>,
    lanes: BTreeMap<Wire, Vec<OpId>>,
}

impl Timelines {
    /// Split `circuit` into per-wire lanes. Arena order is scan order.
    pub fn of(circuit: &Circuit) -> Self {
        let mut ops = Vec::with_capacity(circuit.operation_count());
        let mut origins = Vec::with_capacity(circuit.operation_count());
        let mut lanes: BTreeMap<Wire, Vec<OpId>> = BTreeMap::new();

        for (m, moment) in circuit.moments().iter().enumerate() {
            for (i, op) in moment.operations().iter().enumerate() {
                let id = OpId(ops.len());
                for &w in op.wires() {
                    lanes.entry(w).or_default().push(id);
                }
                ops.push(op.clone());
                origins.push(Some(OpRef { moment: m, index: i }));
            }
        }
        Self { ops, origins, lanes }
    }

    pub fn op(&self, id: OpId) -> &Operation {
        &self.ops[id.0]
    }

    pub fn origin(&self, id: OpId) -> Option<OpRef> {
        self.origins[id.0]
    }

    /// Arena ids in scan order.
    pub fn ids(&self) -> impl Iterator<Item = OpId> {
        (0..self.ops.len()).map(OpId)
    }

    pub fn wires(&self) -> impl Iterator<Item = Wire> + '_ {
        self.lanes.keys().copied()
    }

    pub fn lane(&self, wire: Wire) -> &[OpId] {
        self.lanes.get(&wire).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Operations on `wire`, in timeline order.
    pub fn lane_ops(&self, wire: Wire) -> impl Iterator<Item = &Operation> + '_ {
        self.lane(wire).iter().map(move |id| self.op(*id))
    }

    /// Position of `id` within `wire`'s lane.
    pub fn position(&self, wire: Wire, id: OpId) -> Option<usize> {
        self.lane(wire).iter().position(|x| *x == id)
    }

    /// Add an operation to the arena without placing it in any lane.
    pub fn add(&mut self, op: Operation) -> OpId {
        let id = OpId(self.ops.len());
        self.ops.push(op);
        self.origins.push(None);
        id
    }

    /// Rebuild every lane through `edit`: each entry maps to `Some(new id)` to
    /// keep or substitute it, or `None` to drop it.
    pub fn rebuild_lanes<F>(&mut self, mut edit: F)
    where
        F: FnMut(Wire, OpId) -> Option<OpId>,
    {
        let lanes = std::mem::take(&mut self.lanes);
        self.lanes = lanes
            .into_iter()
            .map(|(w, lane)| {
                let rebuilt: Vec<OpId> = lane.into_iter().filter_map(|id| edit(w, id)).collect();
                (w, rebuilt)
            })
            .filter(|(_, lane)| !lane.is_empty())
            .collect();
    }

    /// Turn the lanes back into moments.
    ///
    /// Each round emits, as one moment, every operation that sits at the head
    /// of *all* of its wires' remaining lanes. Heads are on distinct wires, so
    /// every round is a valid moment; a multi-wire operation is emitted once.
    pub fn relinearize(&self) -> Circuit {
        let mut cursor: HashMap<Wire, usize> = self.lanes.keys().map(|w| (*w, 0)).collect();
        let remaining: usize = {
            let mut seen = vec![false; self.ops.len()];
            for id in self.lanes.values().flatten() {
                seen[id.0] = true;
            }
            seen.into_iter().filter(|s| *s).count()
        };

        let mut moments = Vec::new();
        let mut emitted = 0usize;
        while emitted < remaining {
            let mut ready: Vec<OpId> = Vec::new();
            for (w, lane) in &self.lanes {
                let Some(&head) = lane.get(cursor[w]) else { continue };
                let at_head_everywhere = self.ops[head.0].wires().iter().all(|x| {
                    self.lanes
                        .get(x)
                        .and_then(|l| l.get(cursor[x]))
                        .is_some_and(|h| *h == head)
                });
                if at_head_everywhere && !ready.contains(&head) {
                    ready.push(head);
                }
            }
            if ready.is_empty() {
                // Lanes were not a consistent projection of one circuit.
                warn!(emitted, remaining, "timelines deadlocked, dropping unplaced operations");
                break;
            }
            ready.sort();

            let mut moment = Moment::default();
            for id in ready {
                let op = &self.ops[id.0];
                for w in op.wires() {
                    if let Some(c) = cursor.get_mut(w) {
                        *c += 1;
                    }
                }
                let pushed = moment.try_push(op.clone());
                debug_assert!(pushed.is_ok());
                emitted += 1;
            }
            moments.push(moment);
        }
        Circuit::new(moments)
    }
}
