//! C ABI of the aurt runtime support layer.
//!
//! Generated code links against this crate and calls the `au_*` symbols
//! declared in the cbindgen-generated `include/aurt.h`. This crate is
//! one of two that may contain `unsafe` code (along with `aurt-memory`).
//!
//! There is no error-return channel at this boundary: every primitive
//! either succeeds or terminates the process through [`fatal`]. Rust
//! code embedding the runtime works with the `Result`-returning APIs
//! underneath and only collapses to an abort at the outermost layer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, turning a Rust panic into a fatal abort.
///
/// Unwinding across `extern "C"` is undefined, so every exported
/// function wraps its body in this guard. `return` inside the body
/// returns from the guarded closure.
macro_rules! fatal_guard {
    ($body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(payload) => $crate::fatal::abort_on_panic(payload),
        }
    };
}

pub mod args;
pub mod array;
pub mod fatal;
pub mod logging;
pub mod memory;
pub mod output;

pub use args::ArgStore;
pub use fatal::{abort, OrAbort};
pub use memory::AuMemoryStats;
pub use output::{AuFormatArg, AuFormatKind};
