//! Overflow-checked bounds arithmetic.
//!
//! Every element access in generated code is validated by
//! [`element_range`]. The check is done on `(index + 1) * elem_size`
//! with checked arithmetic so a product that would wrap past
//! `usize::MAX` is rejected instead of comparing as a small number.

use std::ops::Range;

use crate::error::RuntimeError;

/// Byte range of element `index` in a view of `size` bytes.
///
/// Succeeds iff `elem_size > 0` and `(index + 1) * elem_size <= size`
/// without overflow. The returned range is always `elem_size` long.
pub fn element_range(
    size: usize,
    index: usize,
    elem_size: usize,
) -> Result<Range<usize>, RuntimeError> {
    if elem_size == 0 {
        return Err(RuntimeError::ZeroElementSize);
    }
    let out_of_bounds = RuntimeError::IndexOutOfBounds {
        index,
        elem_size,
        size,
    };
    let end = index
        .checked_add(1)
        .and_then(|n| n.checked_mul(elem_size))
        .ok_or_else(|| out_of_bounds.clone())?;
    if end > size {
        return Err(out_of_bounds);
    }
    // end did not overflow, so neither does end - elem_size.
    Ok(end - elem_size..end)
}

/// Number of whole `elem_size` elements in `size` bytes.
pub fn element_count(size: usize, elem_size: usize) -> Result<usize, RuntimeError> {
    if elem_size == 0 {
        return Err(RuntimeError::ZeroElementSize);
    }
    Ok(size / elem_size)
}

/// Total byte size of `count` elements of `elem_size` bytes.
pub fn alloc_bytes(count: usize, elem_size: usize) -> Result<usize, RuntimeError> {
    count
        .checked_mul(elem_size)
        .ok_or(RuntimeError::SizeOverflow { count, elem_size })
}
