//! Buffers and argument vectors for tests.

use std::ffi::{c_char, c_int, CString};

/// `len` bytes counting up from 1, wrapping after 255.
///
/// Non-zero at every small offset, so a copy that lands in the wrong
/// place is visible against zeroed memory.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 255) as u8 + 1).collect()
}

/// An owned, NULL-terminated `argv` array as a C entry point receives it.
#[derive(Debug)]
pub struct Argv {
    strings: Vec<CString>,
    ptrs: Vec<*mut c_char>,
}

impl Argv {
    /// # Panics
    ///
    /// If an argument contains an interior NUL.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let strings: Vec<CString> = args
            .into_iter()
            .map(|s| CString::new(s.as_ref()).expect("argument without interior NUL"))
            .collect();
        let mut ptrs: Vec<*mut c_char> = strings.iter().map(|s| s.as_ptr().cast_mut()).collect();
        ptrs.push(std::ptr::null_mut());
        Self { strings, ptrs }
    }

    pub fn argc(&self) -> c_int {
        c_int::try_from(self.strings.len()).expect("argument count fits c_int")
    }

    /// Pointer to the array. Valid while `self` is alive; never written.
    pub fn as_mut_ptr(&mut self) -> *mut *mut c_char {
        self.ptrs.as_mut_ptr()
    }
}
