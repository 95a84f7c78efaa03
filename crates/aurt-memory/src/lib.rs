//! Owned memory blocks and array views for the aurt runtime.
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! `aurt-ffi`). All raw allocator calls live in `raw.rs`; the rest of
//! the crate builds safe, ownership-checked types on top of them.
//!
//! # Architecture
//!
//! ```text
//! OwnedBlock (move-only owner, zeroed on allocate)
//! ├── raw: [16-byte header: len][data ...]   (std::alloc, align 16)
//! ├── Span<'a> / SpanMut<'a>   (borrow-checked byte spans)
//! └── ArrayView                (repr(C) (pointer, byte-length) pair)
//! ```
//!
//! # Ownership events
//!
//! - **Allocate:** [`OwnedBlock::allocate`] creates an owner.
//! - **Reallocate:** [`OwnedBlock::reallocate`] consumes the owner and
//!   returns a new one, possibly at a different address.
//! - **Free:** [`OwnedBlock::free`] (or drop) destroys the owner.
//!
//! Every event is counted in [`stats()`] and logged at `trace`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod block;
mod raw;
pub mod stats;
pub mod view;

pub use block::{copy_bytes, move_bytes, OwnedBlock};
pub use stats::{stats, MemoryStats};
pub use view::{ArrayView, Span, SpanMut};
