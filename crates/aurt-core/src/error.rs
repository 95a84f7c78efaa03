//! Error types for the aurt runtime.
//!
//! The runtime has exactly two failure classes: contract violations
//! (bad index, bad argument lookup, misuse of the argument store) and
//! resource exhaustion (allocation failure). Rust callers see them as
//! [`RuntimeError`]; the C boundary turns every one of them into a
//! process abort.

use thiserror::Error;

use crate::config::ConfigError;
use crate::format::FormatError;

/// Which of the two failure classes an error belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureClass {
    /// A caller broke a documented precondition.
    ContractViolation,
    /// The system could not satisfy a resource request.
    ResourceExhaustion,
}

/// Errors raised by runtime operations above the C boundary.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// `(index + 1) * elem_size` exceeds the view size, or the product
    /// does not fit in `usize`.
    #[error("array index out of bounds: index {index} with element size {elem_size} in a view of {size} bytes")]
    IndexOutOfBounds {
        /// Requested element index.
        index: usize,
        /// Element size in bytes supplied by the caller.
        elem_size: usize,
        /// Total view size in bytes.
        size: usize,
    },
    /// An element size of zero was supplied.
    #[error("element size must be non-zero")]
    ZeroElementSize,
    /// `count * elem_size` overflowed.
    #[error("allocation size overflow: {count} elements of {elem_size} bytes")]
    SizeOverflow {
        /// Requested element count.
        count: usize,
        /// Requested element size.
        elem_size: usize,
    },
    /// The system allocator refused the request.
    #[error("allocation of {bytes} bytes failed")]
    AllocationFailed {
        /// Number of bytes requested.
        bytes: usize,
    },
    /// `n` is not below the captured argument count.
    #[error("argument index {n} out of range: {count} arguments captured")]
    ArgumentOutOfRange {
        /// Requested argument index.
        n: usize,
        /// Number of captured arguments.
        count: usize,
    },
    /// Command-line arguments were captured a second time.
    #[error("command-line arguments already captured")]
    ArgsAlreadyCaptured,
    /// Command-line arguments were queried before capture.
    #[error("command-line arguments queried before capture")]
    ArgsNotCaptured,
    /// `argc` was negative.
    #[error("invalid argument count {argc}")]
    InvalidArgumentCount {
        /// The value received.
        argc: i64,
    },
    /// A required pointer was null.
    #[error("null pointer passed as {what}")]
    NullPointer {
        /// Name of the parameter.
        what: &'static str,
    },
    /// Formatted output failed.
    #[error("format error: {0}")]
    Format(#[from] FormatError),
    /// Runtime configuration was invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RuntimeError {
    /// Classify the error.
    pub fn class(&self) -> FailureClass {
        match self {
            Self::AllocationFailed { .. } | Self::SizeOverflow { .. } => {
                FailureClass::ResourceExhaustion
            }
            _ => FailureClass::ContractViolation,
        }
    }
}
