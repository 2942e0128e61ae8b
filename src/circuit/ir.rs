/// Circuit Intermediate Representation.
///
/// A circuit is an ordered sequence of `Moment`s; each moment is a set of
/// `Operation`s acting on pairwise-disjoint wires. The rewrite rules reason
/// about the *per-wire timeline* (the operations touching one wire, in moment
/// order); the moment packing itself is incidental and may change shape
/// after a rewrite.
///
/// Design principles:
///   - One enum variant per gate, no string dispatch
///   - Gates carry no parameters; operands live on the `Operation`
///   - The disjoint-wire invariant is enforced when a moment is built, never
///     inside a rule
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::builder::CircuitBuilder;
use super::CircuitError;

/// Identifier of one wire (qubit). Wires are never created or destroyed by a
/// rewrite; a circuit's wire set is the union of its operations' wires.
pub type Wire = usize;

// ── Gate ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gate {
    // ── Single-operand gates ────────────────────────────────────────────
    X,
    Y,
    Z,
    H,
    S,
    T,

    // ── Two-operand gates (control, target) ─────────────────────────────
    Cz,
    Cnot,
    Swap,
    ISwap,
    XX,
    YY,
    ZZ,

    // ── Composite gates (introduced only by the merge rules) ────────────
    /// Shared control, two targets: `CNOT(c,t1)·CNOT(c,t2)`.
    Cxx,
    /// Shared control, three targets: `CNOT(c,t1)·CNOT(c,t2)·CNOT(c,t3)`.
    Cxxx,
}

impl Gate {
    /// Every non-composite gate, in vocabulary order.
    pub const PRIMITIVES: [Gate; 13] = [
        Gate::X, Gate::Y, Gate::Z, Gate::H, Gate::S, Gate::T,
        Gate::Cz, Gate::Cnot, Gate::Swap, Gate::ISwap, Gate::XX, Gate::YY, Gate::ZZ,
    ];

    /// Number of wires an operation of this gate acts on.
    pub fn arity(self) -> usize {
        match self {
            Self::X | Self::Y | Self::Z | Self::H | Self::S | Self::T => 1,
            Self::Cz | Self::Cnot | Self::Swap | Self::ISwap
            | Self::XX | Self::YY | Self::ZZ                          => 2,
            Self::Cxx                                                 => 3,
            Self::Cxxx                                                => 4,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::X     => "X",
            Self::Y     => "Y",
            Self::Z     => "Z",
            Self::H     => "H",
            Self::S     => "S",
            Self::T     => "T",
            Self::Cz    => "CZ",
            Self::Cnot  => "CNOT",
            Self::Swap  => "SWAP",
            Self::ISwap => "ISWAP",
            Self::XX    => "XX",
            Self::YY    => "YY",
            Self::ZZ    => "ZZ",
            Self::Cxx   => "CXX",
            Self::Cxxx  => "CXXX",
        }
    }

    /// Composite gates are terminal: no rule matches on or decomposes them.
    pub fn is_composite(self) -> bool {
        matches!(self, Self::Cxx | Self::Cxxx)
    }

    /// True if applying the gate twice to the same ordered wires is the identity.
    pub fn is_self_inverse(self) -> bool {
        !matches!(self, Self::S | Self::T | Self::ISwap)
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

// ── Operation ─────────────────────────────────────────────────────────────

/// One gate application bound to an ordered tuple of wires.
///
/// For two-operand and composite gates the first wire is the control and the
/// remaining wires are targets. Order is significant: `CNOT(a,b) != CNOT(b,a)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operation {
    gate: Gate,
    wires: Vec<Wire>,
}

impl Operation {
    /// Build an operation, checking arity and that no wire repeats.
    pub fn new(gate: Gate, wires: Vec<Wire>) -> Result<Self, CircuitError> {
        if wires.len() != gate.arity() {
            return Err(CircuitError::ArityMismatch {
                gate,
                expected: gate.arity(),
                found: wires.len(),
            });
        }
        for (i, w) in wires.iter().enumerate() {
            if wires[..i].contains(w) {
                return Err(CircuitError::DuplicateWire { gate, wire: *w });
            }
        }
        Ok(Self { gate, wires })
    }

    /// Single-operand operation. Panics if `gate` is not single-operand.
    pub fn single(gate: Gate, wire: Wire) -> Self {
        assert_eq!(gate.arity(), 1, "{gate} is not a single-operand gate");
        Self { gate, wires: vec![wire] }
    }

    /// Two-operand operation. Panics on a multi-operand gate or `control == target`.
    pub fn pair(gate: Gate, control: Wire, target: Wire) -> Self {
        assert_eq!(gate.arity(), 2, "{gate} is not a two-operand gate");
        assert_ne!(control, target, "control and target must be different wires");
        Self { gate, wires: vec![control, target] }
    }

    pub fn h(wire: Wire) -> Self {
        Self::single(Gate::H, wire)
    }

    pub fn x(wire: Wire) -> Self {
        Self::single(Gate::X, wire)
    }

    pub fn cnot(control: Wire, target: Wire) -> Self {
        Self::pair(Gate::Cnot, control, target)
    }

    /// Composite `CXX(c, t1, t2)`. Panics if the wires are not distinct.
    pub fn cxx(control: Wire, target1: Wire, target2: Wire) -> Self {
        Self::composite(Gate::Cxx, control, &[target1, target2])
    }

    /// Composite `CXXX(c, t1, t2, t3)`. Panics if the wires are not distinct.
    pub fn cxxx(control: Wire, target1: Wire, target2: Wire, target3: Wire) -> Self {
        Self::composite(Gate::Cxxx, control, &[target1, target2, target3])
    }

    fn composite(gate: Gate, control: Wire, targets: &[Wire]) -> Self {
        let mut wires = Vec::with_capacity(targets.len() + 1);
        wires.push(control);
        wires.extend_from_slice(targets);
        match Self::new(gate, wires) {
            Ok(op) => op,
            Err(e) => panic!("invalid composite operation: {e}"),
        }
    }

    pub fn gate(&self) -> Gate {
        self.gate
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn touches(&self, wire: Wire) -> bool {
        self.wires.contains(&wire)
    }

    /// True if the two operations share at least one wire.
    pub fn overlaps(&self, other: &Operation) -> bool {
        self.wires.iter().any(|w| other.touches(*w))
    }

    /// First wire of a multi-operand operation.
    pub fn control(&self) -> Option<Wire> {
        if self.wires.len() >= 2 { Some(self.wires[0]) } else { None }
    }

    /// Second wire of a multi-operand operation (first target).
    pub fn target(&self) -> Option<Wire> {
        self.wires.get(1).copied()
    }

    /// `(control, target)` if this is a CNOT.
    pub fn as_cnot(&self) -> Option<(Wire, Wire)> {
        match self.gate {
            Gate::Cnot => Some((self.wires[0], self.wires[1])),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate)?;
        for w in &self.wires {
            write!(f, " {w}")?;
        }
        Ok(())
    }
}

// ── Moment ────────────────────────────────────────────────────────────────

/// A set of operations on pairwise-disjoint wires: one synchronized time step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Moment {
    ops: Vec<Operation>,
}

impl Moment {
    pub fn new(ops: Vec<Operation>) -> Result<Self, CircuitError> {
        let mut moment = Self::default();
        for op in ops {
            moment.try_push(op)?;
        }
        Ok(moment)
    }

    /// Add `op`, rejecting it if one of its wires is already occupied.
    pub fn try_push(&mut self, op: Operation) -> Result<(), CircuitError> {
        if let Some(&wire) = op.wires().iter().find(|w| self.occupies(**w)) {
            return Err(CircuitError::WireConflict { wire, gate: op.gate() });
        }
        self.ops.push(op);
        Ok(())
    }

    pub fn occupies(&self, wire: Wire) -> bool {
        self.ops.iter().any(|op| op.touches(wire))
    }

    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ops.iter().map(|op| op.to_string()).collect();
        write!(f, "{}", parts.join(" | "))
    }
}

// ── Circuit ───────────────────────────────────────────────────────────────

/// An immutable, ordered sequence of moments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Circuit {
    moments: Vec<Moment>,
}

impl Circuit {
    pub fn new(moments: Vec<Moment>) -> Self {
        Self { moments: moments.into_iter().filter(|m| !m.is_empty()).collect() }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a circuit from explicit moments, validating each one.
    pub fn from_moments(moments: Vec<Vec<Operation>>) -> Result<Self, CircuitError> {
        let moments = moments
            .into_iter()
            .map(Moment::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(moments))
    }

    /// Pack a flat emission stream, placing each operation in the earliest
    /// moment after the last one that touches any of its wires.
    pub fn from_operations<I: IntoIterator<Item = Operation>>(ops: I) -> Self {
        let mut builder = CircuitBuilder::new();
        builder.extend(ops);
        builder.finish()
    }

    pub fn moments(&self) -> &[Moment] {
        &self.moments
    }

    /// All operations in scan order (moment by moment).
    pub fn operations(&self) -> impl Iterator<Item = &Operation> + '_ {
        self.moments.iter().flat_map(|m| m.operations().iter())
    }

    pub fn operation_count(&self) -> usize {
        self.moments.iter().map(Moment::len).sum()
    }

    /// Number of moments.
    pub fn depth(&self) -> usize {
        self.moments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    pub fn wires(&self) -> BTreeSet<Wire> {
        self.operations().flat_map(|op| op.wires().iter().copied()).collect()
    }

    /// Operations touching `wire`, in moment order.
    pub fn timeline(&self, wire: Wire) -> Vec<&Operation> {
        self.operations().filter(|op| op.touches(wire)).collect()
    }

    /// Per-wire timelines for every wire in the circuit.
    pub fn timelines(&self) -> BTreeMap<Wire, Vec<&Operation>> {
        let mut lanes: BTreeMap<Wire, Vec<&Operation>> = BTreeMap::new();
        for op in self.operations() {
            for &w in op.wires() {
                lanes.entry(w).or_default().push(op);
            }
        }
        lanes
    }

    /// True if both circuits project to identical per-wire timelines,
    /// regardless of how operations are packed into moments.
    pub fn same_timelines(&self, other: &Circuit) -> bool {
        self.timelines() == other.timelines()
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, moment) in self.moments.iter().enumerate() {
            writeln!(f, "{i:>3}: {moment}")?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_arity() {
        assert_eq!(Gate::H.arity(), 1);
        assert_eq!(Gate::Cnot.arity(), 2);
        assert_eq!(Gate::ISwap.arity(), 2);
        assert_eq!(Gate::Cxx.arity(), 3);
        assert_eq!(Gate::Cxxx.arity(), 4);
    }

    #[test]
    fn test_gate_flags() {
        assert!(Gate::Cxx.is_composite());
        assert!(!Gate::Cnot.is_composite());
        assert!(Gate::H.is_self_inverse());
        assert!(!Gate::S.is_self_inverse());
        assert!(!Gate::ISwap.is_self_inverse());
        assert!(Gate::PRIMITIVES.iter().all(|g| !g.is_composite()));
    }

    #[test]
    fn test_operation_new_validates_arity() {
        let err = Operation::new(Gate::Cnot, vec![0]).unwrap_err();
        assert!(matches!(err, CircuitError::ArityMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_operation_new_rejects_repeated_wire() {
        let err = Operation::new(Gate::Cxx, vec![0, 1, 0]).unwrap_err();
        assert!(matches!(err, CircuitError::DuplicateWire { wire: 0, .. }));
    }

    #[test]
    fn test_operation_control_target() {
        let op = Operation::cnot(3, 1);
        assert_eq!(op.control(), Some(3));
        assert_eq!(op.target(), Some(1));
        assert_eq!(op.as_cnot(), Some((3, 1)));
        assert_eq!(Operation::h(0).control(), None);
        assert_eq!(Operation::h(0).as_cnot(), None);
    }

    #[test]
    #[should_panic]
    fn test_cnot_same_wires_panics() {
        let _ = Operation::cnot(1, 1);
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::h(2).to_string(), "H 2");
        assert_eq!(Operation::cnot(0, 1).to_string(), "CNOT 0 1");
        assert_eq!(Operation::cxx(0, 1, 2).to_string(), "CXX 0 1 2");
    }

    #[test]
    fn test_moment_rejects_shared_wire() {
        let err = Moment::new(vec![Operation::h(0), Operation::cnot(1, 0)]).unwrap_err();
        assert!(matches!(err, CircuitError::WireConflict { wire: 0, gate: Gate::Cnot }));
    }

    #[test]
    fn test_circuit_from_moments_validates() {
        assert!(Circuit::from_moments(vec![vec![Operation::h(0), Operation::h(0)]]).is_err());
        let c = Circuit::from_moments(vec![
            vec![Operation::h(0), Operation::h(1)],
            vec![Operation::cnot(0, 1)],
        ]).unwrap();
        assert_eq!(c.depth(), 2);
        assert_eq!(c.operation_count(), 3);
    }

    #[test]
    fn test_empty_moments_dropped() {
        let c = Circuit::from_moments(vec![vec![], vec![Operation::h(0)], vec![]]).unwrap();
        assert_eq!(c.depth(), 1);
    }

    #[test]
    fn test_wires_and_timelines() {
        let c = Circuit::from_operations(vec![
            Operation::h(0),
            Operation::cnot(0, 2),
            Operation::x(2),
        ]);
        assert_eq!(c.wires().into_iter().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(c.timeline(2), vec![&Operation::cnot(0, 2), &Operation::x(2)]);
        assert_eq!(c.timelines().len(), 2);
        assert!(c.timeline(1).is_empty());
    }

    #[test]
    fn test_same_timelines_ignores_packing() {
        let packed = Circuit::from_operations(vec![Operation::h(0), Operation::h(1)]);
        let spread = Circuit::from_moments(vec![
            vec![Operation::h(1)],
            vec![Operation::h(0)],
        ]).unwrap();
        assert_ne!(packed, spread);
        assert!(packed.same_timelines(&spread));
    }

    #[test]
    fn test_circuit_display() {
        let c = Circuit::from_operations(vec![Operation::h(0), Operation::h(1), Operation::cnot(0, 1)]);
        let s = c.to_string();
        assert!(s.contains("H 0 | H 1"));
        assert!(s.contains("CNOT 0 1"));
    }
}
