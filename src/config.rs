//! Construction knobs for pages and filters.
//!
//! These are plain, `serde`-derived structs rather than a bespoke
//! configuration-file format: this crate has no opinion on how an embedding
//! table/compaction layer stores its configuration (TOML, JSON, flags, …),
//! only on what the knobs are and what they default to.

use serde::{Deserialize, Serialize};

/// Default page size in bytes.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Default Bloom filter bits-per-key.
pub const DEFAULT_BITS_PER_KEY: usize = 10;

/// Default `base_lg`: one filter per `2^11 = 2048` bytes of data-file offset.
pub const DEFAULT_FILTER_BASE_LG: u32 = 11;

/// Options controlling [`DataPageBuilder`](crate::page::data::DataPageBuilder) construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOptions {
    /// Target page size in bytes. Callers compare this against
    /// `estimate_size()` to decide when to rotate to a new page; entries
    /// larger than `page_size` are still accepted and simply yield an
    /// oversize page.
    pub page_size: usize,
}

impl Default for PageOptions {
    fn default() -> Self {
        PageOptions {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Options controlling [`FilterPageBuilder`](crate::page::filter_page::FilterPageBuilder)
/// and the Bloom filter policy it drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Bits of filter bitmap per key added (passed to `BloomFilterPolicy::new`).
    pub bits_per_key: usize,
    /// Log2 of the data-file offset interval between filters.
    pub base_lg: u32,
}

impl Default for FilterOptions {
    fn default() -> Self {
        FilterOptions {
            bits_per_key: DEFAULT_BITS_PER_KEY,
            base_lg: DEFAULT_FILTER_BASE_LG,
        }
    }
}
