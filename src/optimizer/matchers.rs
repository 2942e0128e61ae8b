/// Stateless pattern predicates over one wire's timeline.
///
/// Both matchers take the timeline by iterator, never mutate it, and run in
/// O(timeline length).
use crate::circuit::{Gate, Operation};

/// True iff two occurrences of `gate` appear back to back on the timeline,
/// with no other operation on that wire between them.
pub fn has_adjacent_repeat<'a, I>(timeline: I, gate: Gate) -> bool
where
    I: IntoIterator<Item = &'a Operation>,
{
    let mut previous: Option<Gate> = None;
    for op in timeline {
        if previous == Some(gate) && op.gate() == gate {
            return true;
        }
        previous = Some(op.gate());
    }
    false
}

/// True iff `pattern` occurs in the timeline as an order-preserving,
/// not necessarily contiguous, subsequence of gate tags.
///
/// Operand identity is not compared; callers check wires themselves.
pub fn is_subsequence<'a, I>(pattern: &[Gate], timeline: I) -> bool
where
    I: IntoIterator<Item = &'a Operation>,
{
    let mut wanted = pattern.iter().peekable();
    for op in timeline {
        match wanted.peek() {
            None => break,
            Some(&&g) if g == op.gate() => {
                wanted.next();
            }
            Some(_) => {}
        }
    }
    wanted.peek().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Circuit;

    #[test]
    fn test_adjacent_repeat_found() {
        let t = vec![Operation::x(0), Operation::h(0), Operation::h(0)];
        assert!(has_adjacent_repeat(&t, Gate::H));
        assert!(!has_adjacent_repeat(&t, Gate::X));
    }

    #[test]
    fn test_adjacent_repeat_broken_by_other_op() {
        let t = vec![Operation::h(0), Operation::cnot(0, 1), Operation::h(0)];
        assert!(!has_adjacent_repeat(&t, Gate::H));
    }

    #[test]
    fn test_adjacent_repeat_on_circuit_timeline() {
        let c = Circuit::from_operations(vec![
            Operation::h(0),
            Operation::h(1),
            Operation::h(0),
        ]);
        assert!(has_adjacent_repeat(c.timeline(0), Gate::H));
        assert!(!has_adjacent_repeat(c.timeline(1), Gate::H));
    }

    #[test]
    fn test_subsequence_contiguous_and_gapped() {
        let hch = [Gate::H, Gate::Cnot, Gate::H];
        let contiguous = vec![Operation::h(0), Operation::cnot(0, 1), Operation::h(0)];
        let gapped = vec![
            Operation::h(0),
            Operation::x(0),
            Operation::cnot(1, 0),
            Operation::single(Gate::T, 0),
            Operation::h(0),
        ];
        assert!(is_subsequence(&hch, &contiguous));
        assert!(is_subsequence(&hch, &gapped));
    }

    #[test]
    fn test_subsequence_order_matters() {
        let t = vec![Operation::cnot(0, 1), Operation::h(0), Operation::h(0)];
        assert!(!is_subsequence(&[Gate::H, Gate::Cnot, Gate::H], &t));
    }

    #[test]
    fn test_subsequence_edge_cases() {
        let empty: Vec<Operation> = Vec::new();
        assert!(is_subsequence(&[], &empty));
        assert!(!is_subsequence(&[Gate::H], &empty));
        let short = vec![Operation::h(0)];
        assert!(!is_subsequence(&[Gate::H, Gate::H], &short));
    }
}
