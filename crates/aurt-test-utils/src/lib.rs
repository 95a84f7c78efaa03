//! Test utilities for aurt development.
//!
//! The runtime's failure path terminates the process, which an in-process
//! test cannot observe. [`death`] re-runs a single test in a child process
//! and reports how that child died. [`fixtures`] holds small builders for
//! buffers and `argv` arrays.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod death;
pub mod fixtures;

pub use death::{in_child, Death, DeathTest};
pub use fixtures::{pattern, Argv};
