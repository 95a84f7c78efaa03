//! Process argument capture.
//!
//! The generated `main` hands `argc`/`argv` to `au_store_cli_args` once,
//! before anything else runs. The bytes are copied into a process-wide
//! [`ArgStore`] so later queries do not depend on the caller keeping
//! `argv` alive. Capturing twice, or querying before capture, is fatal.

use std::ffi::{c_char, c_int, CStr};
use std::sync::OnceLock;

use aurt_core::scalar::Index;
use aurt_core::RuntimeError;
use aurt_memory::ArrayView;

use crate::fatal::OrAbort;
use crate::logging;

static STORE: OnceLock<ArgStore> = OnceLock::new();

/// Immutable copy of the process arguments. Entry 0 is the program name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArgStore {
    args: Vec<Box<[u8]>>,
}

impl ArgStore {
    /// Build a store from owned byte strings.
    pub fn new<I, A>(args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Vec<u8>>,
    {
        Self {
            args: args.into_iter().map(|a| a.into().into_boxed_slice()).collect(),
        }
    }

    /// Copy `argc` NUL-terminated strings out of `argv`.
    ///
    /// # Safety
    ///
    /// When `argc > 0`, `argv` must point at `argc` valid pointers, each to
    /// a NUL-terminated string.
    #[allow(unsafe_code)]
    pub unsafe fn from_raw(argc: c_int, argv: *const *const c_char) -> Result<Self, RuntimeError> {
        let count = usize::try_from(argc).map_err(|_| RuntimeError::InvalidArgumentCount {
            argc: i64::from(argc),
        })?;
        if count == 0 {
            return Ok(Self::default());
        }
        if argv.is_null() {
            return Err(RuntimeError::NullPointer { what: "argv" });
        }
        let mut args = Vec::with_capacity(count);
        for i in 0..count {
            // SAFETY: argv holds argc entries per caller contract.
            let entry = unsafe { *argv.add(i) };
            if entry.is_null() {
                return Err(RuntimeError::NullPointer { what: "argv entry" });
            }
            // SAFETY: entry is a NUL-terminated string per caller contract.
            let bytes = unsafe { CStr::from_ptr(entry) }.to_bytes();
            args.push(Box::<[u8]>::from(bytes));
        }
        Ok(Self { args })
    }

    /// Number of arguments, including the program name.
    pub fn count(&self) -> usize {
        self.args.len()
    }

    /// Bytes of argument `n`, without terminator.
    pub fn get(&self, n: usize) -> Result<&[u8], RuntimeError> {
        self.args
            .get(n)
            .map(|a| &a[..])
            .ok_or(RuntimeError::ArgumentOutOfRange {
                n,
                count: self.count(),
            })
    }

    /// Read-only view of argument `n`.
    pub fn view(&self, n: usize) -> Result<ArrayView, RuntimeError> {
        let bytes = self.get(n)?;
        Ok(ArrayView::from_literal(bytes.as_ptr(), bytes.len()))
    }

    /// Iterate over the arguments in order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.args.iter().map(|a| &a[..])
    }
}

/// Install `store` as the process arguments.
pub fn capture(store: ArgStore) -> Result<&'static ArgStore, RuntimeError> {
    let mut fresh = Some(store);
    let installed = STORE.get_or_init(|| fresh.take().unwrap_or_default());
    if fresh.is_some() {
        return Err(RuntimeError::ArgsAlreadyCaptured);
    }
    log::debug!("captured {} process arguments", installed.count());
    Ok(installed)
}

/// Capture the arguments of the running process from [`std::env::args_os`].
///
/// For Rust hosts that have no `argv` of their own to pass along.
pub fn capture_from_env() -> Result<&'static ArgStore, RuntimeError> {
    capture(ArgStore::new(std::env::args_os().map(os_bytes)))
}

#[cfg(unix)]
fn os_bytes(arg: std::ffi::OsString) -> Vec<u8> {
    use std::os::unix::ffi::OsStringExt;
    arg.into_vec()
}

#[cfg(not(unix))]
fn os_bytes(arg: std::ffi::OsString) -> Vec<u8> {
    arg.to_string_lossy().into_owned().into_bytes()
}

/// The captured arguments.
pub fn captured() -> Result<&'static ArgStore, RuntimeError> {
    STORE.get().ok_or(RuntimeError::ArgsNotCaptured)
}

// ── FFI functions ───────────────────────────────────────────────

/// Record the process arguments. Must be called exactly once, first.
///
/// Also installs the stderr logger, so `AURT_LOG` takes effect from here.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_store_cli_args(argc: c_int, argv: *mut *mut c_char) {
    fatal_guard!({
        logging::init();
        // SAFETY: argv comes straight from the C entry point.
        let store = unsafe { ArgStore::from_raw(argc, argv.cast_const().cast()) }.or_abort();
        capture(store).or_abort();
    })
}

/// Number of captured arguments, including the program name.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_get_argc() -> Index {
    fatal_guard!({ captured().or_abort().count() })
}

/// Read-only view of argument `n`, without terminator. Aborts unless
/// `n < au_get_argc()`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_get_nth_arg(n: Index) -> ArrayView {
    fatal_guard!({ captured().and_then(|store| store.view(n)).or_abort() })
}
