//! Formatted output to stdout.
//!
//! C variadics cannot be defined on stable Rust. The variadic
//! [`au_printf`] is a small C shim (`csrc/printf.c`) that renders with
//! `vsnprintf` and hands the bytes to [`au_print_array`]. Callers that
//! want format checking by this crate instead widen each argument into
//! an [`AuFormatArg`] and pass the array to `au_printf_args`. Output is
//! flushed after every call so that text printed before a fatal abort is
//! never lost.

use std::ffi::{c_char, CStr};
use std::io::Write;

use aurt_core::format::{format_into, FormatArg, FormatError};
use aurt_core::scalar::{Unit, NIL};
use aurt_core::RuntimeError;
use aurt_memory::ArrayView;

use crate::fatal::{abort_with, OrAbort};

/// Kind tag of a formatted-output argument.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuFormatKind {
    /// Signed integer in `value`, reinterpreted as `i64`.
    Int = 0,
    /// Unsigned integer in `value`.
    Uint = 1,
    /// Byte in the low 8 bits of `value`.
    Char = 2,
    /// `len` bytes at `bytes`.
    Bytes = 3,
    /// Address in `value`.
    Ptr = 4,
}

/// One argument to `au_printf_args`.
///
/// `kind` is a format kind tag passed as a plain integer so that an
/// out-of-range value from C is detected instead of being undefined.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct AuFormatArg {
    /// Format kind tag.
    pub kind: i32,
    /// Scalar payload.
    pub value: u64,
    /// Byte string payload, for the `Bytes` kind.
    pub bytes: *const u8,
    /// Length of `bytes`.
    pub len: usize,
}

impl AuFormatArg {
    /// Signed integer argument.
    pub fn int(v: i64) -> Self {
        Self::scalar(AuFormatKind::Int, v as u64)
    }

    /// Unsigned integer argument.
    pub fn uint(v: u64) -> Self {
        Self::scalar(AuFormatKind::Uint, v)
    }

    /// Byte string argument borrowing `s`.
    pub fn bytes(s: &[u8]) -> Self {
        Self {
            kind: AuFormatKind::Bytes as i32,
            value: 0,
            bytes: s.as_ptr(),
            len: s.len(),
        }
    }

    fn scalar(kind: AuFormatKind, value: u64) -> Self {
        Self {
            kind: kind as i32,
            value,
            bytes: std::ptr::null(),
            len: 0,
        }
    }

    /// Decode into a [`FormatArg`].
    ///
    /// # Safety
    ///
    /// For a `Bytes` argument, `bytes` must be valid for `len` reads for `'a`.
    #[allow(unsafe_code)]
    unsafe fn decode<'a>(&self, position: usize) -> Result<FormatArg<'a>, RuntimeError> {
        let arg = match self.kind {
            k if k == AuFormatKind::Int as i32 => FormatArg::Int(self.value as i64),
            k if k == AuFormatKind::Uint as i32 => FormatArg::Uint(self.value),
            k if k == AuFormatKind::Char as i32 => FormatArg::Char(self.value as u8),
            k if k == AuFormatKind::Ptr as i32 => FormatArg::Ptr(self.value as usize),
            k if k == AuFormatKind::Bytes as i32 => {
                if self.bytes.is_null() {
                    if self.len > 0 {
                        return Err(RuntimeError::NullPointer {
                            what: "format string argument",
                        });
                    }
                    FormatArg::Bytes(&[])
                } else {
                    // SAFETY: upheld by caller.
                    FormatArg::Bytes(unsafe { std::slice::from_raw_parts(self.bytes, self.len) })
                }
            }
            kind => return Err(FormatError::UnknownArgumentKind { position, kind }.into()),
        };
        Ok(arg)
    }
}

fn write_stdout(bytes: &[u8]) {
    let mut out = std::io::stdout().lock();
    if let Err(e) = out.write_all(bytes).and_then(|()| out.flush()) {
        log::warn!("stdout write failed: {e}");
    }
}

/// Render `fmt` with `args` and write the result to stdout.
///
/// Nothing is written if formatting fails. Returns the byte count.
pub fn print_formatted(fmt: &[u8], args: &[FormatArg<'_>]) -> Result<usize, RuntimeError> {
    let mut buf = Vec::with_capacity(fmt.len());
    let n = format_into(&mut buf, fmt, args)?;
    write_stdout(&buf);
    Ok(n)
}

/// Write `bytes` to stdout verbatim and flush.
pub fn print_bytes(bytes: &[u8]) {
    write_stdout(bytes);
}

// ── FFI functions ───────────────────────────────────────────────

extern "C" {
    /// Print `format` rendered by the C library's `vsnprintf`.
    ///
    /// Defined in `csrc/printf.c`. Aborts on a null format or an encoding
    /// error.
    pub fn au_printf(format: *const c_char, ...) -> Unit;
}

/// Print the NUL-terminated `format` rendered with `n` arguments.
///
/// Aborts on a null format, a malformed directive, or an argument that
/// does not match its conversion.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_printf_args(
    format: *const c_char,
    args: *const AuFormatArg,
    n: usize,
) -> Unit {
    fatal_guard!({
        if format.is_null() {
            abort_with(&RuntimeError::NullPointer { what: "format" });
        }
        if args.is_null() && n > 0 {
            abort_with(&RuntimeError::NullPointer {
                what: "format arguments",
            });
        }
        // SAFETY: format is a NUL-terminated string per caller contract.
        let fmt = unsafe { CStr::from_ptr(format) }.to_bytes();
        let raw: &[AuFormatArg] = if n == 0 {
            &[]
        } else {
            // SAFETY: args points at n initialised entries per caller contract.
            unsafe { std::slice::from_raw_parts(args, n) }
        };
        let decoded = raw
            .iter()
            .enumerate()
            // SAFETY: byte string arguments outlive this call.
            .map(|(i, a)| unsafe { a.decode(i) })
            .collect::<Result<Vec<_>, _>>()
            .or_abort();
        print_formatted(fmt, &decoded).or_abort();
        NIL
    })
}

/// Print the bytes of `array` to stdout verbatim.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_print_array(array: ArrayView) -> Unit {
    fatal_guard!({
        if array.data.is_null() && array.size > 0 {
            abort_with(&RuntimeError::NullPointer { what: "print array" });
        }
        // SAFETY: the view covers live bytes per caller contract.
        print_bytes(unsafe { array.as_span() }.as_bytes());
        NIL
    })
}
