//! Owned memory blocks and the raw copy primitives.
//!
//! An [`OwnedBlock`] is the single owner of a zero-initialised heap
//! region. Ownership moves on [`reallocate`](OwnedBlock::reallocate),
//! ends on [`free`](OwnedBlock::free) or drop, and can be handed to C
//! as a bare data pointer with [`into_raw`](OwnedBlock::into_raw).

use std::fmt;
use std::ops::Range;
use std::ptr::NonNull;

use aurt_core::{bounds, RuntimeError};

use crate::raw;
use crate::stats;
use crate::view::{ArrayView, Span, SpanMut};

/// Exclusive owner of a heap block.
///
/// Move-only: there is no `Clone`. Dropping the block frees it.
pub struct OwnedBlock {
    data: NonNull<u8>,
    len: usize,
}

// SAFETY: OwnedBlock is the unique owner of its allocation, like Box<[u8]>.
#[allow(unsafe_code)]
unsafe impl Send for OwnedBlock {}
// SAFETY: shared access only hands out &[u8].
#[allow(unsafe_code)]
unsafe impl Sync for OwnedBlock {}

impl OwnedBlock {
    /// Allocate `count * elem_size` zeroed bytes.
    pub fn allocate(count: usize, elem_size: usize) -> Result<Self, RuntimeError> {
        let len = bounds::alloc_bytes(count, elem_size)?;
        Self::zeroed(len)
    }

    /// Allocate `len` zeroed bytes.
    pub fn zeroed(len: usize) -> Result<Self, RuntimeError> {
        let data = raw::alloc_zeroed(len)?;
        stats::record_alloc(len);
        log::trace!("allocate {len} bytes at {:p}", data);
        Ok(Self { data, len })
    }

    /// Allocate a block holding a copy of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RuntimeError> {
        let mut block = Self::zeroed(bytes.len())?;
        block.as_mut_slice().copy_from_slice(bytes);
        Ok(block)
    }

    /// Resize to `new_len` bytes, consuming the block.
    ///
    /// The first `min(len, new_len)` bytes are preserved and any new
    /// bytes are zero. The returned block may live at a different
    /// address. If the allocator fails, the original block is released
    /// and the error returned.
    #[allow(unsafe_code)]
    pub fn reallocate(self, new_len: usize) -> Result<Self, RuntimeError> {
        let old = self.data;
        let old_len = self.len;
        // SAFETY: self owns `old`; on success it is invalidated and
        // ownership moves into the returned block.
        let data = unsafe { raw::realloc(old, new_len)? };
        std::mem::forget(self);
        stats::record_realloc(old_len, new_len);
        log::trace!("reallocate {:p} ({old_len} bytes) -> {:p} ({new_len} bytes)", old, data);
        Ok(Self { data, len: new_len })
    }

    /// Release the block. Equivalent to dropping it.
    pub fn free(self) {
        drop(self);
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the block holds zero bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Data pointer. Never null, even for empty blocks.
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    /// Mutable data pointer.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.as_ptr()
    }

    /// The bytes.
    #[allow(unsafe_code)]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: data is valid for len initialised bytes while self lives.
        unsafe { std::slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    /// The bytes, mutably.
    #[allow(unsafe_code)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and &mut self guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.data.as_ptr(), self.len) }
    }

    /// Borrow as a [`Span`].
    pub fn span(&self) -> Span<'_> {
        Span::new(self.as_slice())
    }

    /// Borrow as a [`SpanMut`].
    pub fn span_mut(&mut self) -> SpanMut<'_> {
        SpanMut::new(self.as_mut_slice())
    }

    /// Raw view over the whole block for generated code.
    ///
    /// The view does not own the block and is dangling once the block is
    /// reallocated or freed.
    pub fn view(&mut self) -> ArrayView {
        ArrayView::from_buffer(self.as_mut_ptr(), self.len)
    }

    /// Copy `src` into the block at byte `offset`.
    ///
    /// Borrowing rules already rule out overlap between `src` and the
    /// block.
    pub fn copy_from(&mut self, offset: usize, src: &[u8]) -> Result<(), RuntimeError> {
        let range = self.byte_range(offset, src.len())?;
        self.as_mut_slice()[range].copy_from_slice(src);
        Ok(())
    }

    /// Move `src` to start at byte `dest` within the block. The ranges
    /// may overlap.
    pub fn move_within(&mut self, src: Range<usize>, dest: usize) -> Result<(), RuntimeError> {
        if src.start > src.end {
            return Err(RuntimeError::IndexOutOfBounds {
                index: src.start,
                elem_size: 1,
                size: self.len,
            });
        }
        self.byte_range(src.start, src.len())?;
        self.byte_range(dest, src.len())?;
        self.as_mut_slice().copy_within(src, dest);
        Ok(())
    }

    /// Give up ownership, returning the data pointer.
    ///
    /// Reclaim with [`from_raw`](Self::from_raw) or release through the
    /// C free primitive.
    pub fn into_raw(self) -> *mut u8 {
        let ptr = self.data.as_ptr();
        std::mem::forget(self);
        ptr
    }

    /// Reclaim ownership of a pointer produced by [`into_raw`](Self::into_raw)
    /// (or by the C allocate/reallocate primitives).
    ///
    /// Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or come from this crate's allocator and not have
    /// been freed, reallocated, or reclaimed since. Exactly one owner may
    /// exist afterwards.
    #[allow(unsafe_code)]
    pub unsafe fn from_raw(ptr: *mut u8) -> Option<Self> {
        let data = NonNull::new(ptr)?;
        // SAFETY: caller contract.
        let len = unsafe { raw::block_len(data) };
        Some(Self { data, len })
    }

    fn byte_range(&self, offset: usize, count: usize) -> Result<Range<usize>, RuntimeError> {
        let out_of_bounds = RuntimeError::IndexOutOfBounds {
            index: offset,
            elem_size: count,
            size: self.len,
        };
        let end = offset.checked_add(count).ok_or_else(|| out_of_bounds.clone())?;
        if end > self.len {
            return Err(out_of_bounds);
        }
        Ok(offset..end)
    }
}

impl Drop for OwnedBlock {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        stats::record_free(self.len);
        log::trace!("free {:p} ({} bytes)", self.data, self.len);
        // SAFETY: self is the unique owner and is being destroyed.
        unsafe { raw::dealloc(self.data) };
    }
}

impl fmt::Debug for OwnedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedBlock")
            .field("data", &self.data)
            .field("len", &self.len)
            .finish()
    }
}

impl AsRef<[u8]> for OwnedBlock {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsMut<[u8]> for OwnedBlock {
    fn as_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

/// Copy `count` bytes from `src` to `dest`. Returns `dest`.
///
/// # Safety
///
/// Both pointers must be valid for `count` bytes and the regions must
/// not overlap. `count == 0` performs no access.
#[allow(unsafe_code)]
pub unsafe fn copy_bytes(dest: *mut u8, src: *const u8, count: usize) -> *mut u8 {
    if count > 0 {
        // SAFETY: caller contract.
        unsafe { std::ptr::copy_nonoverlapping(src, dest, count) };
    }
    dest
}

/// Copy `count` bytes from `src` to `dest`; the regions may overlap.
/// Returns `dest`.
///
/// # Safety
///
/// Both pointers must be valid for `count` bytes. `count == 0` performs
/// no access.
#[allow(unsafe_code)]
pub unsafe fn move_bytes(dest: *mut u8, src: *const u8, count: usize) -> *mut u8 {
    if count > 0 {
        // SAFETY: caller contract.
        unsafe { std::ptr::copy(src, dest, count) };
    }
    dest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_is_zeroed_and_sized() {
        let block = OwnedBlock::allocate(8, 4).unwrap();
        assert_eq!(block.len(), 32);
        assert!(block.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn allocate_overflow_is_reported() {
        assert_eq!(
            OwnedBlock::allocate(usize::MAX, 2).unwrap_err(),
            RuntimeError::SizeOverflow {
                count: usize::MAX,
                elem_size: 2
            }
        );
    }

    #[test]
    fn empty_block_has_pointer() {
        let block = OwnedBlock::allocate(0, 16).unwrap();
        assert!(block.is_empty());
        assert!(!block.as_ptr().is_null());
    }

    #[test]
    fn shrink_then_grow_preserves_prefix() {
        let mut block = OwnedBlock::allocate(8, 1).unwrap();
        block
            .as_mut_slice()
            .copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let block = block.reallocate(4).unwrap();
        assert_eq!(block.as_slice(), &[1, 2, 3, 4]);
        let block = block.reallocate(16).unwrap();
        assert_eq!(block.len(), 16);
        assert_eq!(&block.as_slice()[..4], &[1, 2, 3, 4]);
        // Grown bytes must not resurrect the truncated 5..8.
        assert!(block.as_slice()[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn reallocate_failure_is_an_error() {
        let block = OwnedBlock::allocate(4, 1).unwrap();
        assert!(matches!(
            block.reallocate(usize::MAX),
            Err(RuntimeError::AllocationFailed { .. })
        ));
    }

    #[test]
    fn raw_round_trip() {
        let block = OwnedBlock::from_bytes(b"xyz").unwrap();
        let ptr = block.into_raw();
        #[allow(unsafe_code)]
        // SAFETY: ptr came from into_raw and has not been reclaimed.
        let block = unsafe { OwnedBlock::from_raw(ptr) }.unwrap();
        assert_eq!(block.as_slice(), b"xyz");
        #[allow(unsafe_code)]
        // SAFETY: null is always accepted.
        let none = unsafe { OwnedBlock::from_raw(std::ptr::null_mut()) };
        assert!(none.is_none());
    }

    #[test]
    fn copy_from_checks_bounds() {
        let mut block = OwnedBlock::zeroed(4).unwrap();
        block.copy_from(1, &[9, 9]).unwrap();
        assert_eq!(block.as_slice(), &[0, 9, 9, 0]);
        assert!(block.copy_from(3, &[1, 1]).is_err());
        assert!(block.copy_from(usize::MAX, &[1]).is_err());
    }

    #[test]
    fn move_within_handles_overlap() {
        let mut block = OwnedBlock::from_bytes(&[1, 2, 3, 4, 5]).unwrap();
        block.move_within(0..4, 1).unwrap();
        assert_eq!(block.as_slice(), &[1, 1, 2, 3, 4]);
        block.move_within(1..5, 0).unwrap();
        assert_eq!(block.as_slice(), &[1, 2, 3, 4, 4]);
        assert!(block.move_within(2..5, 3).is_err());
    }

    #[test]
    fn raw_copy_primitives() {
        let src = [1u8, 2, 3, 4];
        let mut dst = [0u8; 4];
        #[allow(unsafe_code)]
        // SAFETY: distinct 4-byte arrays.
        let ret = unsafe { copy_bytes(dst.as_mut_ptr(), src.as_ptr(), 4) };
        assert_eq!(ret, dst.as_mut_ptr());
        assert_eq!(dst, src);

        let mut buf = [1u8, 2, 3, 4, 5, 0];
        let p = buf.as_mut_ptr();
        #[allow(unsafe_code)]
        // SAFETY: both ranges lie within buf.
        unsafe {
            move_bytes(p.add(1), p, 5);
        }
        assert_eq!(buf, [1, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn view_covers_block() {
        let mut block = OwnedBlock::allocate(3, 4).unwrap();
        let view = block.view();
        assert_eq!(view.size, 12);
        assert_eq!(view.data, block.as_mut_ptr());
        assert!(view.index(2, 4).is_ok());
        assert!(view.index(3, 4).is_err());
    }

    #[test]
    fn stats_track_ownership_events() {
        let before = crate::stats();
        let block = OwnedBlock::zeroed(10).unwrap();
        let block = block.reallocate(20).unwrap();
        block.free();
        let after = crate::stats();
        assert!(after.allocations > before.allocations);
        assert!(after.reallocations > before.reallocations);
        assert!(after.frees > before.frees);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn allocation_is_exactly_sized_and_zeroed(
                count in 0usize..256,
                elem_size in 0usize..64,
            ) {
                let block = OwnedBlock::allocate(count, elem_size).unwrap();
                prop_assert_eq!(block.len(), count * elem_size);
                prop_assert!(block.as_slice().iter().all(|&b| b == 0));
            }

            #[test]
            fn reallocate_preserves_common_prefix(
                data in proptest::collection::vec(any::<u8>(), 0..256),
                new_len in 0usize..512,
            ) {
                let block = OwnedBlock::from_bytes(&data).unwrap();
                let block = block.reallocate(new_len).unwrap();
                let keep = data.len().min(new_len);
                prop_assert_eq!(block.len(), new_len);
                prop_assert_eq!(&block.as_slice()[..keep], &data[..keep]);
                prop_assert!(block.as_slice()[keep..].iter().all(|&b| b == 0));
            }
        }
    }
}
