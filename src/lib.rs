//! # gatefold
//!
//! Local pattern-based rewriting of quantum gate circuits.
//!
//! A `Circuit` is a sequence of moments of non-overlapping operations. Each
//! rewrite `Rule` recognises one local identity (cancellation, merging,
//! direction flip, sandwich collapse) on per-wire timelines and returns a
//! new circuit; the input is never modified.
//!
//! ## Quick Start
//!
//! ```rust
//! use gatefold::circuit::{Circuit, Operation};
//! use gatefold::harness::verify;
//! use gatefold::optimizer::{CancelAdjacent, Rule};
//!
//! // H·H on wire 0 is the identity
//! let input = Circuit::from_operations(vec![
//!     Operation::h(0),
//!     Operation::h(0),
//!     Operation::x(1),
//! ]);
//!
//! let output = CancelAdjacent::single_qubit().rewrite(&input);
//! assert_eq!(output.operation_count(), 1);
//!
//! // Same unitary, fewer operations
//! let cmp = verify(&input, &output);
//! assert_eq!(cmp.equivalent, Some(true));
//! assert!(cmp.reduced());
//! ```

pub mod circuit;
pub mod core;
pub mod harness;
pub mod optimizer;

pub use circuit::{Circuit, CircuitError, Gate, Operation, Wire};
pub use optimizer::{apply, Pipeline, RewriteStats, Rule, RuleError};
