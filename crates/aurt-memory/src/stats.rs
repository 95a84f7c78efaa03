//! Process-wide block accounting.
//!
//! Counters are relaxed atomics: they are diagnostics, not
//! synchronisation, and may be read while other threads allocate.

use std::sync::atomic::{AtomicU64, Ordering};

static LIVE_BLOCKS: AtomicU64 = AtomicU64::new(0);
static LIVE_BYTES: AtomicU64 = AtomicU64::new(0);
static ALLOCATIONS: AtomicU64 = AtomicU64::new(0);
static REALLOCATIONS: AtomicU64 = AtomicU64::new(0);
static FREES: AtomicU64 = AtomicU64::new(0);

/// Snapshot of the block counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Blocks currently owned.
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

/// Read the current counters.
pub fn stats() -> MemoryStats {
    MemoryStats {
        live_blocks: LIVE_BLOCKS.load(Ordering::Relaxed),
        live_bytes: LIVE_BYTES.load(Ordering::Relaxed),
        allocations: ALLOCATIONS.load(Ordering::Relaxed),
        reallocations: REALLOCATIONS.load(Ordering::Relaxed),
        frees: FREES.load(Ordering::Relaxed),
    }
}

pub(crate) fn record_alloc(len: usize) {
    ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
    LIVE_BLOCKS.fetch_add(1, Ordering::Relaxed);
    LIVE_BYTES.fetch_add(len as u64, Ordering::Relaxed);
}

pub(crate) fn record_realloc(old_len: usize, new_len: usize) {
    REALLOCATIONS.fetch_add(1, Ordering::Relaxed);
    LIVE_BYTES.fetch_add(new_len as u64, Ordering::Relaxed);
    LIVE_BYTES.fetch_sub(old_len as u64, Ordering::Relaxed);
}

pub(crate) fn record_free(len: usize) {
    FREES.fetch_add(1, Ordering::Relaxed);
    LIVE_BLOCKS.fetch_sub(1, Ordering::Relaxed);
    LIVE_BYTES.fetch_sub(len as u64, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Other tests allocate concurrently, so only monotonic counters are
    // compared exactly.
    #[test]
    fn counters_are_monotonic() {
        let before = stats();
        record_alloc(10);
        record_realloc(10, 20);
        record_free(20);
        let after = stats();
        assert!(after.allocations > before.allocations);
        assert!(after.reallocations > before.reallocations);
        assert!(after.frees > before.frees);
    }
}
