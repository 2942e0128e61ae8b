/// Circuit Analysis: static profiling of a circuit.
///
/// Computes structural metrics **without** simulating the circuit:
///
/// | Metric               | Description                                          |
/// |----------------------|------------------------------------------------------|
/// | `operation_count`    | Number of operations                                 |
/// | `depth`              | Critical-path length assuming unbounded parallelism  |
/// | `multi_wire_count`   | Operations on two or more wires                      |
/// | `composite_count`    | `CXX` / `CXXX` operations introduced by merging      |
/// | `gate_histogram`     | Per-mnemonic operation counts                        |
/// | `wire_utilization`   | Number of operations touching each wire              |
///
/// `depth` is recomputed from the per-wire timelines, so it does not depend on
/// how loosely the moments happen to be packed.
use std::collections::{BTreeMap, HashMap};

use super::ir::{Circuit, Wire};

#[derive(Debug, Clone, PartialEq)]
pub struct CircuitAnalysis {
    pub wire_count: usize,
    pub operation_count: usize,
    pub depth: usize,
    pub multi_wire_count: usize,
    pub composite_count: usize,
    pub gate_histogram: BTreeMap<&'static str, usize>,
    pub wire_utilization: BTreeMap<Wire, usize>,
}

impl CircuitAnalysis {
    /// Fraction of operations that act on more than one wire.
    pub fn entanglement_ratio(&self) -> f64 {
        if self.operation_count == 0 { return 0.0; }
        self.multi_wire_count as f64 / self.operation_count as f64
    }

    /// Human-readable profiling report.
    pub fn report(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("  Wires          : {}\n", self.wire_count));
        out.push_str(&format!("  Operations     : {}\n", self.operation_count));
        out.push_str(&format!("  Depth          : {}\n", self.depth));
        out.push_str(&format!(
            "  Multi-wire ops : {}  ({:.1}% entangling)\n",
            self.multi_wire_count,
            self.entanglement_ratio() * 100.0
        ));
        if self.composite_count > 0 {
            out.push_str(&format!("  Composite ops  : {}\n", self.composite_count));
        }

        out.push_str("\n  Gate breakdown:\n");
        let mut hist: Vec<(&&str, &usize)> = self.gate_histogram.iter().collect();
        hist.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (mnemonic, count) in hist {
            out.push_str(&format!("    {:8}  {count}\n", mnemonic));
        }

        out.push_str("\n  Wire utilization:\n");
        let max_uses = self.wire_utilization.values().copied().max().unwrap_or(1).max(1);
        for (w, &uses) in &self.wire_utilization {
            let bar_len = (uses * 20 / max_uses).min(20);
            let bar = "█".repeat(bar_len);
            let pad = " ".repeat(20 - bar_len);
            out.push_str(&format!("    w{w:<2}  {bar}{pad}  {uses}\n"));
        }

        out
    }
}

/// Analyze a circuit. Runs in O(operations × arity).
pub fn analyze(circuit: &Circuit) -> CircuitAnalysis {
    // `wire_time[w]` = depth of the frontier on wire `w`.
    let mut wire_time: HashMap<Wire, usize> = HashMap::new();
    let mut operation_count = 0usize;
    let mut multi_wire_count = 0usize;
    let mut composite_count = 0usize;
    let mut gate_histogram = BTreeMap::new();
    let mut wire_utilization = BTreeMap::new();

    for op in circuit.operations() {
        operation_count += 1;
        *gate_histogram.entry(op.gate().mnemonic()).or_insert(0) += 1;
        if op.wires().len() >= 2 {
            multi_wire_count += 1;
        }
        if op.gate().is_composite() {
            composite_count += 1;
        }

        let start = op
            .wires()
            .iter()
            .map(|w| wire_time.get(w).copied().unwrap_or(0))
            .max()
            .unwrap_or(0);
        for &w in op.wires() {
            wire_time.insert(w, start + 1);
            *wire_utilization.entry(w).or_insert(0) += 1;
        }
    }

    CircuitAnalysis {
        wire_count: wire_utilization.len(),
        operation_count,
        depth: wire_time.values().copied().max().unwrap_or(0),
        multi_wire_count,
        composite_count,
        gate_histogram,
        wire_utilization,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::ir::Operation;

    #[test]
    fn test_bell_depth() {
        let c = Circuit::from_operations(vec![Operation::h(0), Operation::cnot(0, 1)]);
        let a = analyze(&c);
        assert_eq!(a.depth, 2);
        assert_eq!(a.multi_wire_count, 1);
        assert_eq!(a.operation_count, 2);
        assert_eq!(a.wire_count, 2);
    }

    #[test]
    fn test_depth_ignores_loose_packing() {
        let loose = Circuit::from_moments(vec![
            vec![Operation::h(0)],
            vec![Operation::h(1)],
            vec![Operation::h(2)],
        ]).unwrap();
        assert_eq!(loose.depth(), 3);
        assert_eq!(analyze(&loose).depth, 1);
    }

    #[test]
    fn test_histogram_and_composites() {
        let c = Circuit::from_operations(vec![
            Operation::h(0),
            Operation::h(1),
            Operation::cxx(0, 1, 2),
        ]);
        let a = analyze(&c);
        assert_eq!(a.gate_histogram.get("H"), Some(&2));
        assert_eq!(a.gate_histogram.get("CXX"), Some(&1));
        assert_eq!(a.composite_count, 1);
        assert_eq!(a.wire_utilization.get(&0), Some(&2));
        assert_eq!(a.wire_utilization.get(&2), Some(&1));
    }

    #[test]
    fn test_empty_circuit() {
        let a = analyze(&Circuit::empty());
        assert_eq!(a.depth, 0);
        assert_eq!(a.entanglement_ratio(), 0.0);
    }

    #[test]
    fn test_report_mentions_metrics() {
        let c = Circuit::from_operations(vec![Operation::h(0), Operation::cnot(0, 1)]);
        let r = analyze(&c).report();
        assert!(r.contains("Operations     : 2"));
        assert!(r.contains("CNOT"));
        assert!(r.contains("w0"));
    }
}
