/// Ordered composition of rules.
///
/// Each stage consumes the previous stage's full output; stages are never
/// re-entered within one run. `Pipeline::merge_flip()` is the compound
/// shared-target optimization:
///
///   (a) `FlipSharedTarget`     H-bracketed shared-target runs are flipped, so
///                              the run's common target becomes a common control
///   (b) `CancelAdjacent`       the H pairs the flips leave behind cancel
///   (c) `MergeSharedControl`   up to three same-control CNOTs fold into one
///                              composite gate
///
/// On `H(c1)H(c2)H(c3)·CNOT(c1,t)CNOT(c2,t)CNOT(c3,t)·H(c1)H(c2)H(c3)` the
/// result is `H(t)·CXXX(t,c1,c2,c3)·H(t)`. The compound never returns a
/// circuit with more operations than its input.
use tracing::debug;

use super::{
    CancelAdjacent, FlipSharedTarget, MergeSharedControl, RewriteStats, Rule,
};
use crate::circuit::Circuit;

/// What one stage did during a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub rule: &'static str,
    pub stats: RewriteStats,
}

pub struct Pipeline {
    name: &'static str,
    stages: Vec<Box<dyn Rule>>,
    never_grow: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &names)
            .field("never_grow", &self.never_grow)
            .finish()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self { name: "pipeline", stages: Vec::new(), never_grow: false }
    }

    /// Flip shared-target CNOT runs, cancel the H pairs, merge into composites.
    pub fn merge_flip() -> Self {
        Self::new()
            .named("merge-flip-compound")
            .then(FlipSharedTarget::new())
            .then(CancelAdjacent::single_qubit())
            .then(MergeSharedControl::triple())
            .never_grow()
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Return the input unchanged when the final circuit has more operations.
    pub fn never_grow(mut self) -> Self {
        self.never_grow = true;
        self
    }

    /// Append a stage.
    pub fn then<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.stages.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order, reporting each one.
    pub fn run(&self, circuit: &Circuit) -> (Circuit, Vec<StageReport>) {
        let mut current = circuit.clone();
        let mut reports = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let next = stage.rewrite(&current);
            let stats = RewriteStats::between(&current, &next);
            debug!(
                pipeline = self.name,
                stage = stage.name(),
                ops_before = stats.ops_before,
                ops_after = stats.ops_after,
                "stage complete"
            );
            reports.push(StageReport { rule: stage.name(), stats });
            current = next;
        }
        if self.never_grow && current.operation_count() > circuit.operation_count() {
            debug!(
                pipeline = self.name,
                ops_before = circuit.operation_count(),
                ops_after = current.operation_count(),
                "result larger than input, keeping input"
            );
            current = circuit.clone();
        }
        (current, reports)
    }
}

impl Rule for Pipeline {
    fn name(&self) -> &'static str {
        self.name
    }

    fn rewrite(&self, circuit: &Circuit) -> Circuit {
        self.run(circuit).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{analyze, Operation};
    use crate::harness::{Generator, PatternFamily};
    use crate::optimizer::{CancelSandwich, FlipTwoQubit};

    fn three_way(c1: usize, c2: usize, c3: usize, t: usize) -> Circuit {
        Circuit::from_operations(vec![
            Operation::h(c1),
            Operation::h(c2),
            Operation::h(c3),
            Operation::cnot(c1, t),
            Operation::cnot(c2, t),
            Operation::cnot(c3, t),
            Operation::h(c1),
            Operation::h(c2),
            Operation::h(c3),
        ])
    }

    #[test]
    fn test_merge_flip_folds_three_way_template() {
        let (out, reports) = Pipeline::merge_flip().run(&three_way(0, 1, 2, 3));
        let ops: Vec<Operation> = out.operations().cloned().collect();
        assert_eq!(ops, vec![Operation::h(3), Operation::cxxx(3, 0, 1, 2), Operation::h(3)]);
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].rule, "flip-shared-target");
        assert_eq!(reports[0].stats.ops_after, 9 + 3 * 4);
        assert_eq!(reports[1].rule, "cancel-adjacent-single-qubit");
        assert_eq!(reports[2].rule, "merge-shared-control");
    }

    #[test]
    fn test_merge_flip_two_way_run_gives_cxx() {
        let c = Circuit::from_operations(vec![
            Operation::h(0),
            Operation::h(1),
            Operation::cnot(0, 2),
            Operation::cnot(1, 2),
            Operation::h(0),
            Operation::h(1),
        ]);
        let out = Pipeline::merge_flip().rewrite(&c);
        let a = analyze(&out);
        assert_eq!(a.operation_count, 3);
        assert_eq!(a.gate_histogram.get("CXX"), Some(&1));
        assert_eq!(out.timeline(2).len(), 3);
    }

    #[test]
    fn test_merge_flip_leaves_lone_cnot() {
        let c = Circuit::from_operations(vec![Operation::cnot(0, 1), Operation::h(2)]);
        let out = Pipeline::merge_flip().rewrite(&c);
        assert!(out.same_timelines(&c));
    }

    #[test]
    fn test_merge_flip_skips_bare_shared_target_runs() {
        let pair = Circuit::from_operations(vec![Operation::cnot(0, 2), Operation::cnot(1, 2)]);
        let (out, reports) = Pipeline::merge_flip().run(&pair);
        assert_eq!(out, pair);
        assert!(reports.iter().all(|r| !r.stats.fired));

        let third = Circuit::from_operations(vec![
            Operation::cnot(0, 3),
            Operation::cnot(1, 3),
            Operation::cnot(0, 2),
        ]);
        assert_eq!(Pipeline::merge_flip().rewrite(&third), third);
    }

    #[test]
    fn test_merge_flip_never_adds_operations() {
        let wires = [0, 1, 2, 3, 4];
        let p = Pipeline::merge_flip();
        for pattern in PatternFamily::ALL {
            for seed in 0..16 {
                let input = Generator::new(seed).generate(&wires, pattern.min_depth() + 12, pattern).unwrap();
                let out = p.rewrite(&input);
                assert!(
                    out.operation_count() <= input.operation_count(),
                    "{pattern} seed {seed}:\n{input}\n=>\n{out}"
                );
            }
        }
    }

    #[test]
    fn test_never_grow_keeps_input() {
        let c = Circuit::from_operations(vec![Operation::cnot(0, 1)]);
        let growing = Pipeline::new().then(FlipTwoQubit::new());
        assert_eq!(growing.rewrite(&c).operation_count(), 5);
        let (out, reports) = growing.never_grow().run(&c);
        assert_eq!(out, c);
        assert_eq!(reports[0].stats.ops_after, 5);
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let c = three_way(0, 1, 2, 3);
        let p = Pipeline::new();
        assert!(p.is_empty());
        let (out, reports) = p.run(&c);
        assert_eq!(out, c);
        assert!(reports.is_empty());
    }

    #[test]
    fn test_custom_pipeline_flip_then_collapse() {
        let p = Pipeline::new().then(FlipTwoQubit::new()).then(CancelSandwich::new());
        assert_eq!(p.len(), 2);
        let c = Circuit::from_operations(vec![Operation::cnot(2, 5)]);
        let (out, reports) = p.run(&c);
        assert_eq!(out, c);
        assert_eq!(reports[0].stats.ops_after, 5);
        assert_eq!(reports[1].stats.ops_after, 1);
    }

    #[test]
    fn test_debug_lists_stages() {
        let s = format!("{:?}", Pipeline::merge_flip());
        assert!(s.contains("merge-flip-compound"));
        assert!(s.contains("flip-shared-target"));
    }
}
