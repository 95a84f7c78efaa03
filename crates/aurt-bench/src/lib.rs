//! Benchmark workloads for the aurt runtime support layer.
//!
//! - [`index_sweep`]: every valid `(index, elem_size)` pair for a view
//! - [`format_workload`]: a format string and arguments shaped like
//!   typical generated-code output

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use aurt_core::FormatArg;

/// Element sizes swept by the indexing benchmarks.
pub const ELEM_SIZES: [usize; 4] = [1, 4, 8, 16];

/// Every in-bounds `(index, elem_size)` pair for a view of `len` bytes.
pub fn index_sweep(len: usize) -> Vec<(usize, usize)> {
    ELEM_SIZES
        .iter()
        .flat_map(|&elem_size| (0..len / elem_size).map(move |i| (i, elem_size)))
        .collect()
}

/// A format string mixing every conversion with its arguments.
pub fn format_workload() -> (&'static [u8], Vec<FormatArg<'static>>) {
    (
        b"tick %6d: %-8s %08x %+i %c %u%%\n",
        vec![
            FormatArg::Int(1024),
            FormatArg::Bytes(b"agent"),
            FormatArg::Uint(0xBEEF),
            FormatArg::Int(-17),
            FormatArg::Char(b'z'),
            FormatArg::Uint(99),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_stays_in_bounds() {
        for (index, elem_size) in index_sweep(64) {
            assert!((index + 1) * elem_size <= 64);
        }
        assert_eq!(index_sweep(64).len(), 64 + 16 + 8 + 4);
    }

    #[test]
    fn workload_formats() {
        let (fmt, args) = format_workload();
        let out = aurt_core::format::format(fmt, &args).unwrap();
        assert_eq!(out, b"tick   1024: agent    0000beef -17 z 99%\n");
    }
}
