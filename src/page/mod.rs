//! Shared page framing: the page type tag and CRC32-C trailer every page
//! builder appends and every page reader validates.
//!
//! A page is a contiguous byte string whose last 5 bytes are the trailer:
//! one byte [`PageType`] followed by a little-endian `u32` CRC32-C computed
//! over everything preceding the checksum field (payload + type byte). The
//! trailer itself is never included in "payload" elsewhere in this crate.

pub mod data;
pub mod filter_page;

use crate::codec::{decode_fixed32_le, encode_fixed32_le};
use crate::crc::crc32c;

/// Number of trailer bytes appended to every page (`1` type byte + `4` CRC bytes).
pub const PAGE_TRAILER_SIZE: usize = 5;

/// Identifies which page format a byte string was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PageType {
    /// A data page: prefix-compressed sorted records ([`data`]).
    Data = 0,
    /// Reserved for a future multi-page index format; not built by this
    /// crate, but a recognized trailer tag so readers can distinguish it
    /// from corruption.
    Index = 1,
    /// A filter page: per-block Bloom filter bitmaps ([`filter_page`]).
    Filter = 2,
}

impl TryFrom<u8> for PageType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PageType::Data),
            1 => Ok(PageType::Index),
            2 => Ok(PageType::Filter),
            _ => Err(()),
        }
    }
}

/// Appends the page trailer (`type` then `crc32c(payload || type)`) to
/// `buffer` and returns it. Shared by every page builder's `finish`.
pub(crate) fn finish_with_trailer(mut buffer: Vec<u8>, page_type: PageType) -> Vec<u8> {
    buffer.push(page_type as u8);
    let crc = crc32c(&buffer);
    encode_fixed32_le(&mut buffer, crc);
    buffer
}

/// Validates and inspects a finalized page's trailer.
///
/// Does not interpret the payload; `DataPageCursor` and `FilterPageReader`
/// parse the payload once the trailer has been checked.
pub struct PageReader<'a> {
    raw: &'a [u8],
}

impl<'a> PageReader<'a> {
    /// Wraps a raw page byte slice (trailer included).
    pub fn new(raw: &'a [u8]) -> Self {
        PageReader { raw }
    }

    /// Verifies the trailer's CRC32-C against the preceding bytes. A page
    /// shorter than [`PAGE_TRAILER_SIZE`] fails unconditionally.
    pub fn check_crc32c(&self) -> bool {
        if self.raw.len() < PAGE_TRAILER_SIZE {
            return false;
        }
        let body_len = self.raw.len() - 4;
        let computed = crc32c(&self.raw[..body_len]);
        let stored = decode_fixed32_le(&self.raw[body_len..]);
        computed == stored
    }

    /// Returns the page's declared type, or `None` if the page is too short
    /// to have a trailer or the type byte is unrecognized.
    pub fn page_type(&self) -> Option<PageType> {
        if self.raw.len() < PAGE_TRAILER_SIZE {
            return None;
        }
        PageType::try_from(self.raw[self.raw.len() - PAGE_TRAILER_SIZE]).ok()
    }

    /// Everything in the page except the 5-byte trailer.
    pub fn payload(&self) -> &'a [u8] {
        &self.raw[..self.raw.len().saturating_sub(PAGE_TRAILER_SIZE)]
    }
}
