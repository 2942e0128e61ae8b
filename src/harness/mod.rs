/// Test-circuit generation and rewrite verification.
pub mod generator;
pub mod verifier;

pub use generator::{GenerateError, Generator, PatternFamily};
pub use verifier::{sample_distance, verify, ComparisonResult, Verifier, MAX_EXACT_WIRES};
