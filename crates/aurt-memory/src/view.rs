//! Array views: the type-erased `(pointer, byte-length)` pair and its
//! borrow-checked counterparts.
//!
//! [`ArrayView`] is the exact representation generated code passes
//! across the C boundary. It carries no element type; the caller names
//! the element size on every [`index`](ArrayView::index) call. Inside
//! Rust, prefer [`Span`] and [`SpanMut`], which tie the view to the
//! lifetime of the storage they borrow.

use aurt_core::{bounds, RuntimeError};

/// A contiguous memory region of `size` bytes.
///
/// Never owns the memory it describes. `size` must be a multiple of every
/// element size used to index the view; a view cannot detect a caller
/// that breaks this.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayView {
    /// First byte of the region.
    pub data: *mut u8,
    /// Total length in bytes.
    pub size: usize,
}

impl ArrayView {
    /// Wrap an existing buffer. No copy, no ownership transfer.
    pub const fn from_buffer(data: *mut u8, size: usize) -> Self {
        Self { data, size }
    }

    /// Wrap immutable constant data such as a text literal.
    ///
    /// Writing through the result, or handing its pointer to a free
    /// primitive, is undefined.
    pub const fn from_literal(data: *const u8, size: usize) -> Self {
        Self {
            data: data.cast_mut(),
            size,
        }
    }

    /// The zero-length view. Every index into it fails.
    pub const fn empty() -> Self {
        Self {
            data: std::ptr::null_mut(),
            size: 0,
        }
    }

    /// Length in bytes.
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Whether the view covers no bytes.
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Pointer to element `index` of `elem_size` bytes.
    ///
    /// Succeeds iff `(index + 1) * elem_size <= size` with no overflow.
    /// The pointer aliases the view's storage and is valid for
    /// `elem_size` bytes for as long as that storage is.
    pub fn index(&self, index: usize, elem_size: usize) -> Result<*mut u8, RuntimeError> {
        let range = bounds::element_range(self.size, index, elem_size)?;
        Ok(self.data.wrapping_add(range.start))
    }

    /// Number of whole elements of `elem_size` bytes.
    pub fn element_count(&self, elem_size: usize) -> Result<usize, RuntimeError> {
        bounds::element_count(self.size, elem_size)
    }

    /// Borrow the described bytes.
    ///
    /// # Safety
    ///
    /// `data` must be valid for reads of `size` bytes for `'a`, and no
    /// one may write to it while the span is alive. A null `data` is
    /// accepted only when `size == 0`.
    #[allow(unsafe_code)]
    pub unsafe fn as_span<'a>(&self) -> Span<'a> {
        if self.size == 0 {
            return Span::new(&[]);
        }
        // SAFETY: caller contract.
        Span::new(unsafe { std::slice::from_raw_parts(self.data, self.size) })
    }
}

impl Default for ArrayView {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> From<Span<'a>> for ArrayView {
    fn from(span: Span<'a>) -> Self {
        Self::from_literal(span.bytes.as_ptr(), span.bytes.len())
    }
}

/// Read-only byte span borrowed from its storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span<'a> {
    bytes: &'a [u8],
}

impl<'a> Span<'a> {
    /// Borrow `bytes`.
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The bytes.
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Length in bytes.
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the span is empty.
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Element `index` of `elem_size` bytes.
    pub fn element(&self, index: usize, elem_size: usize) -> Result<&'a [u8], RuntimeError> {
        let range = bounds::element_range(self.bytes.len(), index, elem_size)?;
        Ok(&self.bytes[range])
    }

    /// Number of whole elements of `elem_size` bytes.
    pub fn elements(&self, elem_size: usize) -> Result<usize, RuntimeError> {
        bounds::element_count(self.bytes.len(), elem_size)
    }
}

impl<'a> From<&'a [u8]> for Span<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

/// Mutable byte span borrowed from its storage.
#[derive(Debug)]
pub struct SpanMut<'a> {
    bytes: &'a mut [u8],
}

impl<'a> SpanMut<'a> {
    /// Borrow `bytes` mutably.
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the span is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Shared reborrow.
    pub fn as_span(&self) -> Span<'_> {
        Span::new(self.bytes)
    }

    /// Element `index` of `elem_size` bytes, mutably.
    pub fn element_mut(
        &mut self,
        index: usize,
        elem_size: usize,
    ) -> Result<&mut [u8], RuntimeError> {
        let range = bounds::element_range(self.bytes.len(), index, elem_size)?;
        Ok(&mut self.bytes[range])
    }

    /// Raw view for handing to generated code.
    ///
    /// The view is only valid while this span's borrow would be.
    pub fn as_view(&mut self) -> ArrayView {
        ArrayView::from_buffer(self.bytes.as_mut_ptr(), self.bytes.len())
    }
}

impl<'a> From<&'a mut [u8]> for SpanMut<'a> {
    fn from(bytes: &'a mut [u8]) -> Self {
        Self::new(bytes)
    }
}
