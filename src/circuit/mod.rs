/// Circuit data model.
///
/// Layers: `ir` (gates, operations, moments, circuits) → `builder`
/// (emission-order packing) → `timeline` (per-wire views used by the
/// window-based rules) → `analysis` (static metrics).
pub mod analysis;
pub mod builder;
pub mod ir;
pub mod timeline;

pub use analysis::{analyze, CircuitAnalysis};
pub use builder::CircuitBuilder;
pub use ir::{Circuit, Gate, Moment, Operation, Wire};
pub use timeline::{OpId, OpRef, Timelines};

use thiserror::Error;

/// Malformed-input errors, raised only while a circuit is being built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    /// Two operations in one moment share a wire.
    #[error("wire {wire} is already used in this moment (while adding {gate})")]
    WireConflict { wire: Wire, gate: Gate },

    /// Wrong number of wires for the gate.
    #[error("{gate} takes {expected} wire(s), got {found}")]
    ArityMismatch { gate: Gate, expected: usize, found: usize },

    /// The same wire appears twice in one operation.
    #[error("{gate} lists wire {wire} more than once")]
    DuplicateWire { gate: Gate, wire: Wire },
}
