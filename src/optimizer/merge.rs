/// Folding of CNOT chains that share a control wire into composite gates.
///
///   CNOT(c,t1)·CNOT(c,t2)              → CXX(c,t1,t2)
///   CNOT(c,t1)·CNOT(c,t2)·CNOT(c,t3)   → CXXX(c,t1,t2,t3)   (capacity 3)
///
/// One chain is tracked at a time. A CNOT with the chain's control and a new
/// target joins it; any other CNOT commits the chain and starts a new one;
/// any other operation on a wire the chain holds commits the chain first.
/// A chain is committed as the original CNOT (one target), `CXX` (two) or
/// `CXXX` (three), and is emitted as soon as it reaches capacity.
///
/// Operations on wires outside the chain are emitted immediately; the chain's
/// CNOTs only commute past operations on disjoint wires, which is always safe.
use tracing::trace;

use super::pending::{EntryId, PendingTable};
use super::{Rule, RuleError};
use crate::circuit::{Circuit, CircuitBuilder, Operation, Wire};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Chain {
    control: Wire,
    targets: Vec<Wire>,
}

impl Chain {
    fn into_operation(self) -> Operation {
        match self.targets.as_slice() {
            [t] => Operation::cnot(self.control, *t),
            [t1, t2] => Operation::cxx(self.control, *t1, *t2),
            [t1, t2, t3] => Operation::cxxx(self.control, *t1, *t2, *t3),
            other => unreachable!("chain with {} targets", other.len()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSharedControl {
    max_targets: usize,
}

impl Default for MergeSharedControl {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeSharedControl {
    /// Two-target merge producing `CXX`.
    pub fn new() -> Self {
        Self { max_targets: 2 }
    }

    /// Three-target merge producing `CXXX` (and `CXX` for shorter chains).
    pub fn triple() -> Self {
        Self { max_targets: 3 }
    }

    /// Merge up to `max_targets` (2 or 3) same-control CNOTs.
    pub fn with_max_targets(max_targets: usize) -> Result<Self, RuleError> {
        match max_targets {
            2 | 3 => Ok(Self { max_targets }),
            n => Err(RuleError::UnsupportedCapacity(n)),
        }
    }

    pub fn max_targets(&self) -> usize {
        self.max_targets
    }
}

impl Rule for MergeSharedControl {
    fn name(&self) -> &'static str {
        "merge-shared-control"
    }

    fn rewrite(&self, circuit: &Circuit) -> Circuit {
        let mut pending: PendingTable<Chain> = PendingTable::new();
        let mut out = CircuitBuilder::new();
        // The single chain currently tracked, if any.
        let mut chain: Option<EntryId> = None;

        let commit = |pending: &mut PendingTable<Chain>, out: &mut CircuitBuilder, id: EntryId| {
            if let Some(done) = pending.commit(id) {
                if done.targets.len() > 1 {
                    trace!(control = done.control, targets = ?done.targets, "merged shared-control chain");
                }
                out.push(done.into_operation());
            }
        };

        for op in circuit.operations() {
            let Some((control, target)) = op.as_cnot() else {
                if let Some(id) = chain {
                    if op.wires().iter().any(|w| pending.on_wire(*w) == Some(id)) {
                        commit(&mut pending, &mut out, id);
                        chain = None;
                    }
                }
                out.push(op.clone());
                continue;
            };

            if let Some(id) = chain {
                let joins = pending
                    .get(id)
                    .is_some_and(|c| c.control == control && !c.targets.contains(&target));
                if joins {
                    pending.claim(id, target);
                    let full = match pending.get_mut(id) {
                        Some(c) => {
                            c.targets.push(target);
                            c.targets.len() >= self.max_targets
                        }
                        None => false,
                    };
                    if full {
                        commit(&mut pending, &mut out, id);
                        chain = None;
                    }
                    continue;
                }
                commit(&mut pending, &mut out, id);
            }

            let fresh = Chain { control, targets: vec![target] };
            chain = Some(pending.insert(op.wires(), fresh));
        }

        if let Some(id) = chain {
            commit(&mut pending, &mut out, id);
        }
        debug_assert!(pending.is_empty());
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Gate;

    fn run(rule: MergeSharedControl, ops: Vec<Operation>) -> Vec<Operation> {
        rule.rewrite(&Circuit::from_operations(ops)).operations().cloned().collect()
    }

    #[test]
    fn test_two_cnots_merge_into_cxx() {
        let out = run(MergeSharedControl::new(), vec![Operation::cnot(0, 1), Operation::cnot(0, 2)]);
        assert_eq!(out, vec![Operation::cxx(0, 1, 2)]);
    }

    #[test]
    fn test_target_order_is_kept() {
        let out = run(MergeSharedControl::new(), vec![Operation::cnot(1, 2), Operation::cnot(1, 0)]);
        assert_eq!(out, vec![Operation::cxx(1, 2, 0)]);
    }

    #[test]
    fn test_same_target_does_not_merge() {
        let input = vec![Operation::cnot(0, 1), Operation::cnot(0, 1)];
        assert_eq!(run(MergeSharedControl::new(), input.clone()), input);
    }

    #[test]
    fn test_different_control_commits_first_chain() {
        let input = vec![Operation::cnot(0, 1), Operation::cnot(2, 3), Operation::cnot(2, 1)];
        let out = run(MergeSharedControl::new(), input);
        assert_eq!(out, vec![Operation::cnot(0, 1), Operation::cxx(2, 3, 1)]);
    }

    #[test]
    fn test_intervening_op_on_control_blocks_merge() {
        let input = vec![Operation::cnot(0, 1), Operation::h(0), Operation::cnot(0, 2)];
        let out = run(MergeSharedControl::new(), input.clone());
        assert_eq!(out, input);
    }

    #[test]
    fn test_intervening_op_on_first_target_blocks_merge() {
        let input = vec![Operation::cnot(0, 1), Operation::x(1), Operation::cnot(0, 2)];
        let out = run(MergeSharedControl::new(), input);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|op| op.gate() != Gate::Cxx));
    }

    #[test]
    fn test_unrelated_wire_passes_through() {
        let c = MergeSharedControl::new().rewrite(&Circuit::from_operations(vec![
            Operation::cnot(0, 1),
            Operation::h(3),
            Operation::cnot(0, 2),
        ]));
        assert_eq!(c.operation_count(), 2);
        assert_eq!(c.timeline(3), vec![&Operation::h(3)]);
        assert_eq!(c.timeline(0), vec![&Operation::cxx(0, 1, 2)]);
    }

    #[test]
    fn test_third_cnot_starts_new_chain_at_capacity_two() {
        let out = run(MergeSharedControl::new(), vec![
            Operation::cnot(0, 1),
            Operation::cnot(0, 2),
            Operation::cnot(0, 3),
        ]);
        assert_eq!(out, vec![Operation::cxx(0, 1, 2), Operation::cnot(0, 3)]);
    }

    #[test]
    fn test_capacity_three_builds_cxxx() {
        let rule = MergeSharedControl::with_max_targets(3).unwrap();
        assert_eq!(rule, MergeSharedControl::triple());
        let out = run(rule, vec![
            Operation::cnot(0, 1),
            Operation::cnot(0, 2),
            Operation::cnot(0, 3),
        ]);
        assert_eq!(out, vec![Operation::cxxx(0, 1, 2, 3)]);
    }

    #[test]
    fn test_capacity_three_flushes_partial_chain_as_cxx() {
        let rule = MergeSharedControl::with_max_targets(3).unwrap();
        let out = run(rule, vec![Operation::cnot(0, 1), Operation::cnot(0, 2), Operation::h(0)]);
        assert_eq!(out, vec![Operation::cxx(0, 1, 2), Operation::h(0)]);
    }

    #[test]
    fn test_composite_is_never_extended() {
        let input = vec![Operation::cxx(0, 1, 2), Operation::cnot(0, 3)];
        assert_eq!(run(MergeSharedControl::new(), input.clone()), input);
    }

    #[test]
    fn test_invalid_capacity() {
        assert_eq!(MergeSharedControl::with_max_targets(4), Err(RuleError::UnsupportedCapacity(4)));
        assert_eq!(MergeSharedControl::with_max_targets(1), Err(RuleError::UnsupportedCapacity(1)));
    }
}
