//! The fatal path: the only way the runtime terminates a process.
//!
//! Detected contract violations and allocation failures end up here.
//! The message is written verbatim to stderr, stdout is flushed so that
//! normal output emitted before the failure is not lost, and the process
//! terminates according to [`RuntimeConfig::abort`].

use std::any::Any;
use std::io::Write;

use aurt_core::scalar::Unit;
use aurt_core::{AbortStrategy, RuntimeConfig, RuntimeError};
use aurt_memory::ArrayView;

/// Message used when `au_abort` receives a view it cannot read.
const UNREADABLE_MESSAGE: &[u8] = b"abort called with an unreadable message";

/// Print `message` to stderr and terminate. Never returns.
///
/// `message` is pre-rendered text, not a format string.
pub fn abort(message: &[u8]) -> ! {
    log::error!("fatal: {}", String::from_utf8_lossy(message));
    let _ = std::io::stdout().flush();
    {
        let mut err = std::io::stderr().lock();
        let _ = err.write_all(message);
        let _ = err.write_all(b"\n");
        let _ = err.flush();
    }
    terminate(RuntimeConfig::global().abort)
}

/// Abort with the rendering of a [`RuntimeError`].
pub fn abort_with(error: &RuntimeError) -> ! {
    abort(error.to_string().as_bytes())
}

/// End the process according to `strategy`.
pub fn terminate(strategy: AbortStrategy) -> ! {
    match strategy {
        AbortStrategy::Exit { code } => std::process::exit(code),
        AbortStrategy::Trap => std::process::abort(),
    }
}

pub(crate) fn abort_on_panic(payload: Box<dyn Any + Send>) -> ! {
    let msg = panic_message(payload.as_ref());
    abort(format!("internal runtime panic: {msg}").as_bytes())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

/// Collapse a `Result` at the C boundary: the value, or a fatal abort.
pub trait OrAbort<T> {
    /// Unwrap, aborting the process on error.
    fn or_abort(self) -> T;
}

impl<T> OrAbort<T> for Result<T, RuntimeError> {
    fn or_abort(self) -> T {
        match self {
            Ok(value) => value,
            Err(e) => abort_with(&e),
        }
    }
}

// ── FFI functions ───────────────────────────────────────────────

/// Print `message` to stderr and terminate with a non-zero status.
///
/// Declared as returning `au_unit_t` so it can appear in expression
/// position in generated code; it never actually returns.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_abort(message: ArrayView) -> Unit {
    fatal_guard!({
        let bytes = if message.data.is_null() && message.size > 0 {
            UNREADABLE_MESSAGE
        } else {
            // SAFETY: generated code passes a view over live message bytes.
            unsafe { message.as_span() }.as_bytes()
        };
        abort(bytes)
    })
}
