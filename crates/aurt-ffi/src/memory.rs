//! Memory primitives FFI: allocate, reallocate, copy, move, free.
//!
//! Every function here is an ownership event. A pointer returned by
//! `au_calloc` or `au_realloc` is owned by the caller until it is passed
//! to `au_realloc` (which consumes it) or `au_free`. Blocks come from the
//! runtime's own allocator and must not be handed to libc `free`.
//! Use-after-free and double free are not detected.

use std::ffi::c_void;

use aurt_core::scalar::{Unit, NIL};
use aurt_core::RuntimeError;
use aurt_memory::{copy_bytes, move_bytes, stats, MemoryStats, OwnedBlock};

use crate::fatal::{abort_with, OrAbort};

/// C-compatible snapshot of the block counters.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuMemoryStats {
    /// Blocks currently owned by generated code or Rust callers.
    pub live_blocks: u64,
    /// Data bytes held by live blocks.
    pub live_bytes: u64,
    /// Blocks ever allocated.
    pub allocations: u64,
    /// Reallocations performed.
    pub reallocations: u64,
    /// Blocks freed.
    pub frees: u64,
}

// 5×u64 = 40 bytes, align 8.
const _: () = assert!(std::mem::size_of::<AuMemoryStats>() == 40);
const _: () = assert!(std::mem::align_of::<AuMemoryStats>() == 8);

impl From<MemoryStats> for AuMemoryStats {
    fn from(s: MemoryStats) -> Self {
        Self {
            live_blocks: s.live_blocks,
            live_bytes: s.live_bytes,
            allocations: s.allocations,
            reallocations: s.reallocations,
            frees: s.frees,
        }
    }
}

fn require_non_null(ptr: *const c_void, count: usize, what: &'static str) {
    if count > 0 && ptr.is_null() {
        abort_with(&RuntimeError::NullPointer { what });
    }
}

// ── FFI functions ───────────────────────────────────────────────

/// Allocate `size * count` zeroed bytes. Aborts on overflow or
/// allocator failure; never returns null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_calloc(size: usize, count: usize) -> *mut c_void {
    fatal_guard!({
        OwnedBlock::allocate(count, size).or_abort().into_raw().cast()
    })
}

/// Resize the block at `ptr` to `count` bytes, consuming `ptr`.
///
/// Contents are preserved up to the smaller size; new bytes are zero.
/// A null `ptr` allocates a fresh block. The returned pointer may differ
/// from `ptr`, which must not be used again either way.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_realloc(ptr: *mut c_void, count: usize) -> *mut c_void {
    fatal_guard!({
        // SAFETY: ptr is null or a live block from au_calloc/au_realloc,
        // per caller contract.
        let block = match unsafe { OwnedBlock::from_raw(ptr.cast()) } {
            Some(block) => block.reallocate(count),
            None => OwnedBlock::zeroed(count),
        };
        block.or_abort().into_raw().cast()
    })
}

/// Copy `count` bytes from `source` to `destination`, which must not
/// overlap. Returns `destination`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_memcpy(
    destination: *mut c_void,
    source: *mut c_void,
    count: usize,
) -> *mut c_void {
    fatal_guard!({
        require_non_null(destination, count, "memcpy destination");
        require_non_null(source, count, "memcpy source");
        // SAFETY: both regions are valid for count bytes and disjoint,
        // per caller contract.
        unsafe { copy_bytes(destination.cast(), source.cast(), count) }.cast()
    })
}

/// Copy `count` bytes from `source` to `destination`; the regions may
/// overlap. Returns `destination`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_memmove(
    destination: *mut c_void,
    source: *mut c_void,
    count: usize,
) -> *mut c_void {
    fatal_guard!({
        require_non_null(destination, count, "memmove destination");
        require_non_null(source, count, "memmove source");
        // SAFETY: both regions are valid for count bytes, per caller contract.
        unsafe { move_bytes(destination.cast(), source.cast(), count) }.cast()
    })
}

/// Release the block at `ptr`. A null `ptr` is a no-op.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_free(ptr: *mut c_void) -> Unit {
    fatal_guard!({
        // SAFETY: ptr is null or a live block, per caller contract.
        if let Some(block) = unsafe { OwnedBlock::from_raw(ptr.cast()) } {
            block.free();
        }
        NIL
    })
}

/// Write the current block counters to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_memory_stats(out: *mut AuMemoryStats) -> Unit {
    fatal_guard!({
        if out.is_null() {
            abort_with(&RuntimeError::NullPointer {
                what: "memory stats output",
            });
        }
        // SAFETY: out is valid per caller contract.
        unsafe { *out = stats().into() };
        NIL
    })
}
