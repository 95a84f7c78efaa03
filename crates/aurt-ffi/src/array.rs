//! Array view FFI: construction and the bounds-checked index.
//!
//! `au_index_array` is the single bounds check every array access in
//! generated code goes through. A failed check never returns.

use std::ffi::{c_char, c_void};

use aurt_core::scalar::Index;
use aurt_memory::ArrayView;

use crate::fatal::OrAbort;

/// Pointer to element `index` of `elem_size` bytes within `array`.
///
/// Aborts unless `(index + 1) * elem_size <= array.size`, evaluated
/// without overflow. The pointer aliases the array's storage.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_index_array(array: ArrayView, index: Index, elem_size: Index) -> *mut c_void {
    fatal_guard!({ array.index(index, elem_size).or_abort().cast() })
}

/// View over `size` bytes of constant data, e.g. a string literal.
///
/// The result must never be written through or freed.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_make_array_from_string(data: *const c_char, size: usize) -> ArrayView {
    ArrayView::from_literal(data.cast(), size)
}

/// View over `size` bytes of an existing buffer. Takes no ownership.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn au_make_array(data: *mut c_void, size: usize) -> ArrayView {
    ArrayView::from_buffer(data.cast(), size)
}
