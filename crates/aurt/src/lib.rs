//! aurt: the runtime support layer linked into compiled programs.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the aurt sub-crates. Generated C code links `aurt-ffi` directly and
//! includes its `aurt.h`; Rust hosts embedding the runtime use this crate.
//!
//! # Quick start
//!
//! ```rust
//! use aurt::prelude::*;
//!
//! let mut block = OwnedBlock::allocate(4, 8).unwrap();
//! block.copy_from(8, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
//!
//! let view = block.view();
//! let second = view.index(1, 8).unwrap();
//! assert_eq!(second, block.as_mut_ptr().wrapping_add(8));
//! assert!(matches!(
//!     view.index(4, 8),
//!     Err(RuntimeError::IndexOutOfBounds { .. })
//! ));
//!
//! let text = aurt::types::format::format(b"%s=%03d", &[
//!     FormatArg::Bytes(b"x"),
//!     FormatArg::Int(7),
//! ]).unwrap();
//! assert_eq!(text, b"x=007");
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `aurt-core` | Scalar aliases, bounds arithmetic, errors, config, formatter |
//! | [`memory`] | `aurt-memory` | Array views, owned blocks, allocation counters |
//! | [`ffi`] | `aurt-ffi` | The `au_*` C ABI, fatal path, argument store |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Scalar aliases, bounds arithmetic, errors, and configuration (`aurt-core`).
pub use aurt_core as types;

/// Array views and owned blocks (`aurt-memory`).
///
/// [`memory::ArrayView`] is the C-layout view passed across the boundary;
/// [`memory::OwnedBlock`] owns a zeroed allocation.
pub use aurt_memory as memory;

/// The C ABI (`aurt-ffi`).
///
/// Rust hosts normally only need [`ffi::abort`], [`ffi::OrAbort`], and the
/// [`ffi::args`] capture functions.
pub use aurt_ffi as ffi;

/// Common imports for embedding the runtime.
pub mod prelude {
    pub use aurt_core::scalar::{Bool, Index, Unit, FALSE, NIL, TRUE};
    pub use aurt_core::{AbortStrategy, FailureClass, FormatArg, RuntimeConfig, RuntimeError};
    pub use aurt_ffi::{abort, ArgStore, OrAbort};
    pub use aurt_memory::{ArrayView, OwnedBlock, Span, SpanMut};
}
