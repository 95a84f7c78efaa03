//! Core types for the aurt runtime support layer.
//!
//! This is the leaf crate with zero internal dependencies. It holds the
//! pieces of the runtime that need no `unsafe`: the fixed-width scalar
//! aliases generated code is written against, the error taxonomy, the
//! overflow-checked bounds arithmetic behind every array index, runtime
//! configuration, and the printf-style formatter.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bounds;
pub mod config;
pub mod error;
pub mod format;
pub mod scalar;

pub use bounds::{alloc_bytes, element_count, element_range};
pub use config::{AbortStrategy, ConfigError, RuntimeConfig};
pub use error::{FailureClass, RuntimeError};
pub use format::{FormatArg, FormatError};
