//! Parsers for the two remote diagnostic outputs.
//!
//! Both tools print fixed-layout whitespace-delimited tables, so parsing is
//! positional: skip the header, split each line on whitespace, require a
//! minimum field count, pick fields by index. Rows below the minimum are
//! dropped rather than treated as errors, but the drop is counted so
//! callers can surface it instead of losing data silently.

mod gpu;
mod storage;

pub use gpu::parse_gpu_table;
pub use storage::parse_storage_table;

/// Records recovered from one table, plus how many rows fell short of the
/// minimum field count and were discarded.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub dropped: usize,
}
