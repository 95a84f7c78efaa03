//! Low-level primitives for block memory operations.
//!
//! Every block is one `std::alloc` allocation laid out as a 16-byte
//! header followed by the caller-visible data:
//!
//! ```text
//! base                 data = base + HEADER
//! | len: usize | pad  | data bytes ...
//! ```
//!
//! Recording the length in the header lets reallocate and free work from
//! the data pointer alone, which is all the C boundary passes back.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

use aurt_core::RuntimeError;

/// Bytes reserved in front of the data. Keeps the data 16-byte aligned.
pub(crate) const HEADER: usize = 16;
/// Alignment of both the allocation and the data pointer.
pub(crate) const ALIGN: usize = 16;

const _: () = assert!(HEADER >= std::mem::size_of::<usize>());
const _: () = assert!(HEADER % ALIGN == 0);

fn layout_for(len: usize) -> Result<Layout, RuntimeError> {
    let failed = RuntimeError::AllocationFailed { bytes: len };
    let total = len.checked_add(HEADER).ok_or(failed.clone())?;
    Layout::from_size_align(total, ALIGN).map_err(|_| failed)
}

/// Allocate `len` zeroed data bytes. Returns the data pointer.
pub(crate) fn alloc_zeroed(len: usize) -> Result<NonNull<u8>, RuntimeError> {
    let layout = layout_for(len)?;
    // SAFETY: layout size is at least HEADER, so non-zero.
    let base = unsafe { alloc::alloc_zeroed(layout) };
    let base = NonNull::new(base).ok_or(RuntimeError::AllocationFailed { bytes: len })?;
    // SAFETY: base is a fresh allocation of HEADER + len bytes aligned to ALIGN.
    unsafe {
        base.as_ptr().cast::<usize>().write(len);
        Ok(NonNull::new_unchecked(base.as_ptr().add(HEADER)))
    }
}

/// Data length recorded in the header of the block at `data`.
///
/// # Safety
///
/// `data` must have been returned by [`alloc_zeroed`] or [`realloc`] and
/// not yet passed to [`dealloc`] or [`realloc`].
pub(crate) unsafe fn block_len(data: NonNull<u8>) -> usize {
    // SAFETY: the header sits HEADER bytes before data, per caller contract.
    unsafe { data.as_ptr().sub(HEADER).cast::<usize>().read() }
}

/// Resize the block at `data` to `new_len` data bytes.
///
/// Bytes past the old length are zeroed. On error the block at `data`
/// is untouched and still owned by the caller.
///
/// # Safety
///
/// Same contract as [`block_len`]. On success `data` is invalidated.
pub(crate) unsafe fn realloc(
    data: NonNull<u8>,
    new_len: usize,
) -> Result<NonNull<u8>, RuntimeError> {
    let new_layout = layout_for(new_len)?;
    // SAFETY: caller contract.
    let old_len = unsafe { block_len(data) };
    let old_layout = layout_for(old_len)?;
    // SAFETY: base/old_layout describe the live allocation; new size is
    // non-zero and was validated by layout_for.
    let base = unsafe { alloc::realloc(data.as_ptr().sub(HEADER), old_layout, new_layout.size()) };
    let base = NonNull::new(base).ok_or(RuntimeError::AllocationFailed { bytes: new_len })?;
    // SAFETY: base now holds HEADER + new_len bytes; the tail past the
    // preserved prefix is in bounds.
    unsafe {
        base.as_ptr().cast::<usize>().write(new_len);
        let data = base.as_ptr().add(HEADER);
        if new_len > old_len {
            ptr::write_bytes(data.add(old_len), 0, new_len - old_len);
        }
        Ok(NonNull::new_unchecked(data))
    }
}

/// Release the block at `data`.
///
/// # Safety
///
/// Same contract as [`block_len`]. `data` is invalidated.
pub(crate) unsafe fn dealloc(data: NonNull<u8>) {
    // SAFETY: caller contract.
    let len = unsafe { block_len(data) };
    // The layout was valid at allocation time, so it still is.
    if let Ok(layout) = layout_for(len) {
        // SAFETY: base/layout describe the live allocation.
        unsafe { alloc::dealloc(data.as_ptr().sub(HEADER), layout) };
    }
}
