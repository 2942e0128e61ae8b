/// Cancellation of back-to-back self-inverse operations.
///
/// Scan operations in moment order, keeping at most one pending copy of the
/// chosen gate per wire (or per ordered wire pair for two-operand gates):
///
///   - the gate arrives and an identical operation is pending → cancel both
///   - the gate arrives otherwise → commit whatever is pending on its wires,
///     then make it pending
///   - any other operation arrives → commit what is pending on *each* of its
///     wires, then emit it
///
/// Whatever is still pending at the end is emitted in insertion order. Only
/// operations with an identical gate and identical ordered wires cancel, so
/// `CNOT(0,1)·CNOT(1,0)` survives.
use tracing::trace;

use super::pending::PendingTable;
use super::{Rule, RuleError};
use crate::circuit::{Circuit, CircuitBuilder, Gate, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelAdjacent {
    gate: Gate,
}

impl CancelAdjacent {
    /// H·H → I on the same wire.
    pub fn single_qubit() -> Self {
        Self { gate: Gate::H }
    }

    /// CNOT(c,t)·CNOT(c,t) → I on the same ordered pair.
    pub fn two_qubit() -> Self {
        Self { gate: Gate::Cnot }
    }

    /// Cancel adjacent pairs of any primitive self-inverse gate.
    pub fn new(gate: Gate) -> Result<Self, RuleError> {
        if gate.is_composite() {
            return Err(RuleError::CompositeGate(gate));
        }
        if !gate.is_self_inverse() {
            return Err(RuleError::NotSelfInverse(gate));
        }
        Ok(Self { gate })
    }

    pub fn gate(&self) -> Gate {
        self.gate
    }
}

impl Rule for CancelAdjacent {
    fn name(&self) -> &'static str {
        if self.gate.arity() == 1 {
            "cancel-adjacent-single-qubit"
        } else {
            "cancel-adjacent-two-qubit"
        }
    }

    fn rewrite(&self, circuit: &Circuit) -> Circuit {
        let mut pending: PendingTable<Operation> = PendingTable::new();
        let mut out = CircuitBuilder::new();

        for op in circuit.operations() {
            if op.gate() != self.gate {
                out.extend(pending.commit_touching(op.wires()));
                out.push(op.clone());
                continue;
            }

            let twin = pending
                .on_wire(op.wires()[0])
                .filter(|id| pending.get(*id) == Some(op));
            if let Some(id) = twin {
                pending.cancel(id);
                trace!(op = %op, "adjacent pair cancelled");
                continue;
            }

            out.extend(pending.commit_touching(op.wires()));
            pending.insert(op.wires(), op.clone());
        }

        out.extend(pending.drain());
        out.finish()
    }
}
