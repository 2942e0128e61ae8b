/// Gate-circuit rewrite rules.
///
/// Each rule owns exactly one local identity and is a pure function from one
/// `Circuit` to a new `Circuit`:
///
///   1. Cancel-adjacent        H·H → I on one wire, CNOT·CNOT → I on one pair
///   2. Merge-shared-control   CNOT(c,t1)·CNOT(c,t2) → CXX(c,t1,t2)
///   3. Flip                   CNOT(c,t) → H(c)H(t)·CNOT(t,c)·H(t)H(c)
///   4. Sandwich collapse      H(c)H(t)·CNOT(c,t)·H(t)H(c) → CNOT(t,c)
///   5. Merge-flip pipeline    shared-target CNOT runs → flipped, cleaned, merged
///
/// Rules never call each other except through a `Pipeline`. State used while
/// scanning (pending tables, lane views) is created per call and dropped
/// before the call returns, so rules are `Send + Sync` and safe to run on
/// independent circuits from several threads.
pub mod cancel;
pub mod flip;
pub mod matchers;
pub mod merge;
pub mod pending;
pub mod pipeline;
pub mod sandwich;

pub use cancel::CancelAdjacent;
pub use flip::{FlipSharedTarget, FlipTwoQubit};
pub use matchers::{has_adjacent_repeat, is_subsequence};
pub use merge::MergeSharedControl;
pub use pipeline::{Pipeline, StageReport};
pub use sandwich::CancelSandwich;

use thiserror::Error;
use tracing::debug;

use crate::circuit::{Circuit, Gate};

/// A single rewrite identity.
pub trait Rule: Send + Sync {
    /// Short kebab-case name used in logs and stage reports.
    fn name(&self) -> &'static str;

    /// Rewrite `circuit` into a new circuit. Never fails: a pattern that is
    /// not found, or a gate the rule does not know, leaves the input as is.
    fn rewrite(&self, circuit: &Circuit) -> Circuit;
}

/// Invalid rule configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("{0} is not self-inverse and cannot be cancelled pairwise")]
    NotSelfInverse(Gate),

    #[error("composite gate {0} is terminal and cannot be matched")]
    CompositeGate(Gate),

    #[error("merge capacity must be 2 or 3 targets, got {0}")]
    UnsupportedCapacity(usize),
}

/// Statistics reported after applying a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteStats {
    pub ops_before: usize,
    pub ops_after: usize,
    /// Operations eliminated; zero when a rule expands the circuit.
    pub ops_removed: usize,
    /// True if the output timelines differ from the input timelines.
    pub fired: bool,
}

impl RewriteStats {
    pub fn between(before: &Circuit, after: &Circuit) -> Self {
        let ops_before = before.operation_count();
        let ops_after = after.operation_count();
        Self {
            ops_before,
            ops_after,
            ops_removed: ops_before.saturating_sub(ops_after),
            fired: !before.same_timelines(after),
        }
    }

    /// Fraction of operations eliminated (0.0 – 1.0).
    pub fn reduction_ratio(&self) -> f64 {
        if self.ops_before == 0 { return 0.0; }
        self.ops_removed as f64 / self.ops_before as f64
    }

    pub fn reduction_percent(&self) -> f64 {
        self.reduction_ratio() * 100.0
    }
}

/// Run one rule and report what it did.
pub fn apply(rule: &dyn Rule, circuit: &Circuit) -> (Circuit, RewriteStats) {
    let out = rule.rewrite(circuit);
    let stats = RewriteStats::between(circuit, &out);
    debug!(
        rule = rule.name(),
        ops_before = stats.ops_before,
        ops_after = stats.ops_after,
        fired = stats.fired,
        "rule applied"
    );
    (out, stats)
}
