//! Error types for LTN.

use thiserror::Error;

/// The main error type for LTN operations.
#[derive(Debug, Error)]
pub enum LtnError {
    /// Candle tensor operation failed
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// Domain shape is not a sequence of non-negative integers
    #[error("invalid domain '{name}': {message}")]
    InvalidDomain { name: String, message: String },

    /// Value or individuals do not match the declared domain shape
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// Variable label uses a reserved prefix
    #[error("variable label '{0}' is reserved: labels starting with 'diag' are not allowed")]
    ReservedName(String),

    /// Same label bound to two different individual counts in one call
    #[error("domain conflict: '{label}' has {first} individuals in one operand and {second} in another")]
    DomainConflict {
        label: String,
        first: usize,
        second: usize,
    },

    /// Operands cannot be aligned (internal invariant violation)
    #[error("broadcast error: {0}")]
    BroadcastShape(String),

    /// An axiom still has free variables when aggregated
    #[error("axiom '{axiom}' is not closed: free variables {free:?}")]
    UnquantifiedAxiom { axiom: String, free: Vec<String> },

    /// Bad constructor or call arguments
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for LTN operations.
pub type Result<T> = std::result::Result<T, LtnError>;
