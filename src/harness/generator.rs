/// Random circuits with a guaranteed pattern occurrence.
///
/// Each `PatternFamily` names one rewrite identity and a template that
/// instantiates it on randomly chosen wires. `Generator::generate` pads the
/// template with random filler operations up to exactly `max_depth`
/// operations and inserts the template as one contiguous block, so its
/// operations are adjacent on every wire they touch.
///
/// | Family | Letter | Template                                    | Wires | Depth |
/// |--------|--------|---------------------------------------------|-------|-------|
/// | MergeFlip   | a | H(ci)·CNOT(c1,t)CNOT(c2,t)CNOT(c3,t)·H(ci) | 4 | 9 |
/// | CancelSingle| b | H(c)·H(c)                                   | 1 | 2 |
/// | CancelTwo   | c | CNOT(c,t)·CNOT(c,t)                         | 2 | 2 |
/// | MergeShared | d | CNOT(c,t1)·CNOT(c,t2)                       | 3 | 2 |
/// | Flip        | e | CNOT(c,t)                                   | 2 | 1 |
/// | Sandwich    | f | H(c)H(t)·CNOT(c,t)·H(c)H(t)                 | 2 | 5 |
use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use crate::circuit::{Circuit, Gate, Operation, Wire};
use crate::optimizer::{
    CancelAdjacent, CancelSandwich, FlipTwoQubit, MergeSharedControl, Pipeline, Rule,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternFamily {
    MergeFlip,
    CancelSingle,
    CancelTwo,
    MergeShared,
    Flip,
    Sandwich,
}

impl PatternFamily {
    pub const ALL: [PatternFamily; 6] = [
        Self::MergeFlip,
        Self::CancelSingle,
        Self::CancelTwo,
        Self::MergeShared,
        Self::Flip,
        Self::Sandwich,
    ];

    pub fn letter(self) -> char {
        match self {
            Self::MergeFlip    => 'a',
            Self::CancelSingle => 'b',
            Self::CancelTwo    => 'c',
            Self::MergeShared  => 'd',
            Self::Flip         => 'e',
            Self::Sandwich     => 'f',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.letter() == letter.to_ascii_lowercase())
    }

    pub fn min_wires(self) -> usize {
        match self {
            Self::MergeFlip    => 4,
            Self::CancelSingle => 1,
            Self::CancelTwo    => 2,
            Self::MergeShared  => 3,
            Self::Flip         => 2,
            Self::Sandwich     => 2,
        }
    }

    /// Template length; `max_depth` may not be smaller.
    pub fn min_depth(self) -> usize {
        match self {
            Self::MergeFlip    => 9,
            Self::CancelSingle => 2,
            Self::CancelTwo    => 2,
            Self::MergeShared  => 2,
            Self::Flip         => 1,
            Self::Sandwich     => 5,
        }
    }

    /// The rewrite this family exercises.
    pub fn rule(self) -> Box<dyn Rule> {
        match self {
            Self::MergeFlip    => Box::new(Pipeline::merge_flip()),
            Self::CancelSingle => Box::new(CancelAdjacent::single_qubit()),
            Self::CancelTwo    => Box::new(CancelAdjacent::two_qubit()),
            Self::MergeShared  => Box::new(MergeSharedControl::new()),
            Self::Flip         => Box::new(FlipTwoQubit::new()),
            Self::Sandwich     => Box::new(CancelSandwich::new()),
        }
    }

    /// Instantiate the template on distinct wires drawn from `wires`.
    fn template<R: Rng>(self, rng: &mut R, wires: &[Wire]) -> Vec<Operation> {
        let picked: Vec<Wire> = wires.choose_multiple(rng, self.min_wires()).copied().collect();
        match (self, picked.as_slice()) {
            (Self::MergeFlip, &[c1, c2, c3, t]) => vec![
                Operation::h(c1),
                Operation::h(c2),
                Operation::h(c3),
                Operation::cnot(c1, t),
                Operation::cnot(c2, t),
                Operation::cnot(c3, t),
                Operation::h(c1),
                Operation::h(c2),
                Operation::h(c3),
            ],
            (Self::CancelSingle, &[c]) => vec![Operation::h(c), Operation::h(c)],
            (Self::CancelTwo, &[c, t]) => vec![Operation::cnot(c, t), Operation::cnot(c, t)],
            (Self::MergeShared, &[c, t1, t2]) => vec![Operation::cnot(c, t1), Operation::cnot(c, t2)],
            (Self::Flip, &[c, t]) => vec![Operation::cnot(c, t)],
            (Self::Sandwich, &[c, t]) => vec![
                Operation::h(c),
                Operation::h(t),
                Operation::cnot(c, t),
                Operation::h(c),
                Operation::h(t),
            ],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for PatternFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MergeFlip    => "merge-flip",
            Self::CancelSingle => "cancel-single",
            Self::CancelTwo    => "cancel-two",
            Self::MergeShared  => "merge-shared",
            Self::Flip         => "flip",
            Self::Sandwich     => "sandwich",
        };
        write!(f, "{name} ({})", self.letter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("pattern {pattern} needs at least {required} wires, got {available}")]
    TooFewWires { pattern: PatternFamily, required: usize, available: usize },

    #[error("pattern {pattern} needs a depth of at least {required}, got {requested}")]
    DepthTooSmall { pattern: PatternFamily, required: usize, requested: usize },

    #[error("wire {0} is listed more than once")]
    DuplicateWire(Wire),
}

/// Seeded generator of pattern-bearing circuits.
pub struct Generator {
    rng: StdRng,
}

impl Generator {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// A circuit of exactly `max_depth` operations over `wires` containing
    /// at least one occurrence of `pattern`.
    pub fn generate(
        &mut self,
        wires: &[Wire],
        max_depth: usize,
        pattern: PatternFamily,
    ) -> Result<Circuit, GenerateError> {
        for (i, w) in wires.iter().enumerate() {
            if wires[..i].contains(w) {
                return Err(GenerateError::DuplicateWire(*w));
            }
        }
        if wires.len() < pattern.min_wires() {
            return Err(GenerateError::TooFewWires {
                pattern,
                required: pattern.min_wires(),
                available: wires.len(),
            });
        }
        if max_depth < pattern.min_depth() {
            return Err(GenerateError::DepthTooSmall {
                pattern,
                required: pattern.min_depth(),
                requested: max_depth,
            });
        }

        let template = pattern.template(&mut self.rng, wires);
        let filler: Vec<Operation> = (0..max_depth - template.len())
            .map(|_| self.filler_op(wires))
            .collect();
        let at = self.rng.gen_range(0..=filler.len());
        debug!(%pattern, at, filler = filler.len(), "placing template");

        let mut ops = Vec::with_capacity(max_depth);
        ops.extend_from_slice(&filler[..at]);
        ops.extend(template);
        ops.extend_from_slice(&filler[at..]);
        Ok(Circuit::from_operations(ops))
    }

    /// One random primitive operation on random distinct wires.
    fn filler_op(&mut self, wires: &[Wire]) -> Operation {
        let gate = loop {
            let g = Gate::PRIMITIVES[self.rng.gen_range(0..Gate::PRIMITIVES.len())];
            if g.arity() <= wires.len() {
                break g;
            }
        };
        let chosen: Vec<Wire> = wires.choose_multiple(&mut self.rng, gate.arity()).copied().collect();
        match chosen.as_slice() {
            &[w] => Operation::single(gate, w),
            &[c, t] => Operation::pair(gate, c, t),
            _ => unreachable!("primitive gates take one or two wires"),
        }
    }
}
