//! Fixed-width scalar types shared with generated code.
//!
//! Every alias matches the C typedef emitted into the runtime header, so
//! values cross the boundary without conversion.

use std::ffi::c_void;

/// The unit type. Always `NIL` (0).
pub type Unit = u8;
/// Boolean, one byte: `FALSE` (0) or `TRUE` (1).
pub type Bool = u8;
/// Unsigned 8-bit integer.
pub type Nat8 = u8;
/// Signed 8-bit integer.
pub type Int8 = i8;
/// Unsigned 16-bit integer.
pub type Nat16 = u16;
/// Signed 16-bit integer.
pub type Int16 = i16;
/// Unsigned 32-bit integer.
pub type Nat32 = u32;
/// Signed 32-bit integer.
pub type Int32 = i32;
/// Unsigned 64-bit integer.
pub type Nat64 = u64;
/// Signed 64-bit integer.
pub type Int64 = i64;
/// Pointer-sized unsigned index.
pub type Index = usize;
/// Untyped function pointer.
pub type FnPtr = *mut c_void;
/// Opaque region tag. Carries no meaning inside the runtime.
pub type Region = u8;

/// The only value of [`Unit`].
pub const NIL: Unit = 0;
/// Boolean false.
pub const FALSE: Bool = 0;
/// Boolean true.
pub const TRUE: Bool = 1;

/// Convert a Rust `bool` to the one-byte boolean.
pub const fn to_bool(b: bool) -> Bool {
    if b {
        TRUE
    } else {
        FALSE
    }
}

/// Interpret a one-byte boolean. Any non-zero byte is true.
pub const fn from_bool(b: Bool) -> bool {
    b != FALSE
}

// Layout assertions for ABI stability.
const _: () = assert!(std::mem::size_of::<Unit>() == 1);
const _: () = assert!(std::mem::size_of::<Bool>() == 1);
const _: () = assert!(std::mem::size_of::<Nat16>() == 2);
const _: () = assert!(std::mem::size_of::<Int32>() == 4);
const _: () = assert!(std::mem::size_of::<Int64>() == 8);
const _: () = assert!(std::mem::size_of::<Index>() == std::mem::size_of::<*const u8>());
const _: () = assert!(std::mem::size_of::<FnPtr>() == std::mem::size_of::<usize>());
const _: () = assert!(std::mem::size_of::<Region>() == 1);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_conversion() {
        assert_eq!(to_bool(true), TRUE);
        assert_eq!(to_bool(false), FALSE);
        assert!(from_bool(TRUE));
        assert!(!from_bool(FALSE));
        assert!(from_bool(0xFF));
    }

    #[test]
    fn signedness_matches_names() {
        assert_eq!(Int8::MIN, -128);
        assert_eq!(Nat8::MAX, 255);
        assert_eq!(Int64::MIN, i64::MIN);
        assert_eq!(Nat64::MAX, u64::MAX);
    }
}
