//! Page layer for a log-structured-merge storage engine.
//!
//! `litelsm` persists sorted key/value data in immutable, fixed-size pages.
//! This crate owns the **page layer**: the byte-exact serialization format,
//! the builder that packs sorted records into a page, the cursor that
//! navigates a page, and the Bloom-filter side-index that accompanies data
//! pages. Write-ahead logging, multi-page table files, compaction,
//! memtables, transactions, and cross-page iteration live above this layer
//! and are out of scope here.
//!
//! ## Quick example
//!
//! ```
//! use litelsm::comparator::{BytewiseComparator, Comparator};
//! use litelsm::config::PageOptions;
//! use litelsm::page::data::{DataPageBuilder, DataPageCursor};
//!
//! let mut builder = DataPageBuilder::new(PageOptions::default());
//! builder.add(b"apple", b"1");
//! builder.add(b"banana", b"2");
//! let page = builder.finish();
//!
//! let comparator = BytewiseComparator;
//! let mut cursor = DataPageCursor::new(&page, &comparator).unwrap();
//! cursor.seek_to_first();
//! assert_eq!(cursor.key(), b"apple");
//! cursor.next();
//! assert_eq!(cursor.key(), b"banana");
//! ```
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`codec`] | Little-endian fixed-width and varint encode/decode |
//! | [`crc`] | CRC32-C primitive used by every page trailer |
//! | [`comparator`] | Pluggable three-way key comparator |
//! | [`filter`] | Pluggable Bloom filter policy |
//! | [`page`] | Shared page framing (type tag + checksum trailer) |
//! | [`page::data`] | Data page builder and cursor (prefix compression, restart points) |
//! | [`page::filter_page`] | Filter page builder and reader |
//! | [`config`] | `PageOptions` / `FilterOptions` construction knobs |
//! | [`file`] | Minimal file abstraction for persisting finalized pages |

pub mod codec;
pub mod comparator;
pub mod config;
pub mod crc;
pub mod file;
pub mod filter;
pub mod page;

use thiserror::Error;

/// Errors returned by `litelsm` operations.
#[derive(Error, Debug)]
pub enum LsmError {
    /// An I/O error occurred while persisting or reading a page (see [`file`]).
    #[error("I/O error: {0}")]
    Io(String),

    /// A page failed integrity validation: CRC mismatch, truncated footer,
    /// or a restart/offset array that could not possibly be consistent with
    /// the page's length.
    #[error("corruption: {0}")]
    Corruption(String),

    /// An invalid argument was supplied to a builder or reader.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
