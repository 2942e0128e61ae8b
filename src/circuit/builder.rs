/// Earliest-moment packing of an operation stream.
///
/// Every scan-based rule emits its output as a flat stream and lets the
/// builder pack it. An operation lands in the first moment after the last
/// moment touching any of its wires, so the per-wire order of the stream is
/// exactly the per-wire order of the resulting circuit.
use std::collections::HashMap;

use super::ir::{Circuit, Moment, Operation, Wire};

#[derive(Debug, Default)]
pub struct CircuitBuilder {
    moments: Vec<Moment>,
    /// Index of the first moment still free on each wire.
    frontier: HashMap<Wire, usize>,
}

impl CircuitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: Operation) {
        let slot = op
            .wires()
            .iter()
            .map(|w| self.frontier.get(w).copied().unwrap_or(0))
            .max()
            .unwrap_or(0);
        if slot == self.moments.len() {
            self.moments.push(Moment::default());
        }
        for &w in op.wires() {
            self.frontier.insert(w, slot + 1);
        }
        // Every wire of `op` is free from `slot` onward.
        let pushed = self.moments[slot].try_push(op);
        debug_assert!(pushed.is_ok(), "frontier out of sync with moment occupancy");
    }

    pub fn extend<I: IntoIterator<Item = Operation>>(&mut self, ops: I) {
        for op in ops {
            self.push(op);
        }
    }

    pub fn len(&self) -> usize {
        self.moments.iter().map(Moment::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    pub fn finish(self) -> Circuit {
        Circuit::new(self.moments)
    }
}
