//! Filter pages: one [`FilterPolicy`] bitmap per `2^base_lg` bytes of
//! data-file offset, letting a reader skip a data page entirely when a
//! lookup key cannot possibly be in it.
//!
//! A filter page's payload is `filter_data || offset_array || array_offset
//! (u32) || base_lg (u8)`. `filter_data` is the concatenation of one filter
//! bitmap per covered block; `offset_array` is a little-endian `u32` per
//! filter giving its start within `filter_data`. This mirrors how a
//! block-addressed filter index is laid out in LSM engines generally: the
//! builder is fed `(block_offset, key)` pairs in file order and lazily
//! closes out a filter whenever the block offset crosses into a new
//! `2^base_lg` range.

use crate::codec::{decode_fixed32_le, encode_fixed32_le};
use crate::config::FilterOptions;
use crate::filter::FilterPolicy;
use crate::page::{finish_with_trailer, PageType, PAGE_TRAILER_SIZE};
use crate::LsmError;

/// Builds one filter page by consuming keys in file order alongside the
/// data-file offset of the block each key belongs to.
pub struct FilterPageBuilder<'p> {
    policy: &'p dyn FilterPolicy,
    base_lg: u32,
    keys: Vec<u8>,
    key_ends: Vec<usize>,
    result: Vec<u8>,
    filter_offsets: Vec<u32>,
}

impl<'p> FilterPageBuilder<'p> {
    /// Creates a builder driven by `policy`, generating one filter per
    /// `2^options.base_lg` bytes of data-file offset.
    pub fn new(policy: &'p dyn FilterPolicy, options: FilterOptions) -> Self {
        FilterPageBuilder {
            policy,
            base_lg: options.base_lg,
            keys: Vec::new(),
            key_ends: Vec::new(),
            result: Vec::new(),
            filter_offsets: Vec::new(),
        }
    }

    /// Informs the builder that the next keys added belong to the data
    /// block starting at `block_offset`. Closes out (and may emit empty)
    /// filters for every `2^base_lg` range between the previous call and
    /// this one.
    pub fn start_block(&mut self, block_offset: u64) {
        let filter_index = block_offset >> self.base_lg;
        while filter_index > self.filter_offsets.len() as u64 {
            self.generate_filter();
        }
    }

    /// Adds one key, attributed to whichever block the most recent
    /// `start_block` call named.
    pub fn add_key(&mut self, key: &[u8]) {
        self.keys.extend_from_slice(key);
        self.key_ends.push(self.keys.len());
    }

    fn generate_filter(&mut self) {
        self.filter_offsets.push(self.result.len() as u32);
        if self.key_ends.is_empty() {
            return;
        }

        let mut start = 0usize;
        let keys: Vec<&[u8]> = self
            .key_ends
            .iter()
            .map(|&end| {
                let key = &self.keys[start..end];
                start = end;
                key
            })
            .collect();
        self.policy.create_filter(&keys, &mut self.result);

        self.keys.clear();
        self.key_ends.clear();
    }

    /// Finalizes the page: flushes any pending keys into a last filter,
    /// appends the offset array, `array_offset`, `base_lg`, and trailer.
    pub fn finish(mut self) -> Vec<u8> {
        if !self.key_ends.is_empty() {
            self.generate_filter();
        }

        let array_offset = self.result.len() as u32;
        for offset in &self.filter_offsets {
            encode_fixed32_le(&mut self.result, *offset);
        }
        encode_fixed32_le(&mut self.result, array_offset);
        self.result.push(self.base_lg as u8);

        finish_with_trailer(self.result, PageType::Filter)
    }
}

/// Reads a finalized filter page, answering "might `key` be in the block at
/// `block_offset`?" queries.
pub struct FilterPageReader<'a> {
    policy: &'a dyn FilterPolicy,
    data: &'a [u8],
    offsets: &'a [u8],
    num_filters: usize,
    base_lg: u32,
    /// `true` if the payload was too short to hold even the offset-array
    /// tail (`array_offset` + `base_lg`). Per the format's truncation
    /// handling, such a page is treated as empty: every query conservatively
    /// answers "maybe" rather than failing to open.
    empty: bool,
}

impl<'a> FilterPageReader<'a> {
    /// Opens a reader over `page` (trailer included), matched against
    /// `policy`. Does not check the page's CRC — callers should validate
    /// with [`PageReader::check_crc32c`](crate::page::PageReader::check_crc32c)
    /// first. A payload shorter than 5 bytes is not an error: it is treated
    /// as an empty filter page, and every subsequent `key_may_match` call
    /// conservatively returns `true`.
    pub fn new(page: &'a [u8], policy: &'a dyn FilterPolicy) -> Result<Self, LsmError> {
        if page.len() < PAGE_TRAILER_SIZE {
            return Err(LsmError::Corruption("page shorter than trailer".into()));
        }
        let payload = &page[..page.len() - PAGE_TRAILER_SIZE];
        if payload.len() < 5 {
            return Ok(FilterPageReader {
                policy,
                data: &[],
                offsets: &[],
                num_filters: 0,
                base_lg: 0,
                empty: true,
            });
        }

        let base_lg = payload[payload.len() - 1] as u32;
        let payload = &payload[..payload.len() - 1];

        let array_offset = decode_fixed32_le(&payload[payload.len() - 4..]) as usize;
        if array_offset > payload.len() - 4 {
            return Err(LsmError::Corruption(
                "filter page array offset out of range".into(),
            ));
        }

        let data = &payload[..array_offset];
        let offsets = &payload[array_offset..payload.len() - 4];
        if offsets.len() % 4 != 0 {
            return Err(LsmError::Corruption(
                "filter page offset array is not a whole number of u32s".into(),
            ));
        }

        Ok(FilterPageReader {
            policy,
            data,
            offsets,
            num_filters: offsets.len() / 4,
            base_lg,
            empty: false,
        })
    }

    /// `true` if `key` might be present in the block at `block_offset`.
    /// Conservatively returns `true` (never filters out a real match) for
    /// an out-of-range block index or a truncated/empty page; returns
    /// `false` only when the relevant filter is well-formed and
    /// definitively excludes `key`.
    pub fn key_may_match(&self, block_offset: u64, key: &[u8]) -> bool {
        if self.empty {
            return true;
        }
        let index = (block_offset >> self.base_lg) as usize;
        if index >= self.num_filters {
            return true;
        }

        let start = self.offset_at(index) as usize;
        let limit = if index + 1 < self.num_filters {
            self.offset_at(index + 1) as usize
        } else {
            self.data.len()
        };
        if start > limit || limit > self.data.len() {
            return true;
        }

        let filter = &self.data[start..limit];
        if filter.is_empty() {
            return false;
        }
        self.policy.key_may_match(key, filter)
    }

    fn offset_at(&self, index: usize) -> u32 {
        decode_fixed32_le(&self.offsets[index * 4..index * 4 + 4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::BloomFilterPolicy;

    fn options(base_lg: u32) -> FilterOptions {
        FilterOptions {
            bits_per_key: 10,
            base_lg,
        }
    }

    #[test]
    fn single_block_filter_matches_its_own_keys() {
        let policy = BloomFilterPolicy::default();
        let mut builder = FilterPageBuilder::new(&policy, options(11));
        builder.start_block(0);
        builder.add_key(b"apple");
        builder.add_key(b"banana");
        let page = builder.finish();

        let reader = FilterPageReader::new(&page, &policy).unwrap();
        assert!(reader.key_may_match(0, b"apple"));
        assert!(reader.key_may_match(0, b"banana"));
    }

    #[test]
    fn keys_from_a_different_block_do_not_leak_across_the_boundary() {
        let policy = BloomFilterPolicy::default();
        let base_lg = 11u32;
        let block_size = 1u64 << base_lg;
        let mut builder = FilterPageBuilder::new(&policy, options(base_lg));

        builder.start_block(0);
        for i in 0..200u32 {
            builder.add_key(&i.to_le_bytes());
        }
        builder.start_block(block_size * 3);
        for i in 1_000_000..1_000_200u32 {
            builder.add_key(&i.to_le_bytes());
        }
        let page = builder.finish();

        let reader = FilterPageReader::new(&page, &policy).unwrap();
        for i in 0..200u32 {
            assert!(reader.key_may_match(0, &i.to_le_bytes()));
        }
        for i in 1_000_000..1_000_200u32 {
            assert!(reader.key_may_match(block_size * 3, &i.to_le_bytes()));
        }

        // The skipped block (index 1) got no keys at all, so its filter is
        // empty and must reject everything.
        assert!(!reader.key_may_match(block_size, b"anything"));
    }

    #[test]
    fn empty_builder_still_produces_a_readable_page() {
        let policy = BloomFilterPolicy::default();
        let builder = FilterPageBuilder::new(&policy, options(11));
        let page = builder.finish();

        // No filters were ever generated, so every query is out of range
        // and conservatively answers "maybe" rather than "no".
        let reader = FilterPageReader::new(&page, &policy).unwrap();
        assert!(reader.key_may_match(0, b"anything"));
    }

    #[test]
    fn truncated_payload_is_treated_as_empty_and_always_maybe() {
        let policy = BloomFilterPolicy::default();
        // Fewer than 5 payload bytes: too short to hold array_offset + base_lg.
        let page = finish_with_trailer(vec![0u8; 3], PageType::Filter);
        let reader = FilterPageReader::new(&page, &policy).unwrap();
        assert!(reader.key_may_match(0, b"anything"));
        assert!(reader.key_may_match(u64::MAX, b"anything"));
    }

    #[test]
    fn query_past_the_last_known_block_is_conservatively_true() {
        let policy = BloomFilterPolicy::default();
        let mut builder = FilterPageBuilder::new(&policy, options(11));
        builder.start_block(0);
        builder.add_key(b"only-key");
        let page = builder.finish();

        let reader = FilterPageReader::new(&page, &policy).unwrap();
        assert!(reader.key_may_match(1 << 20, b"never-added"));
    }
}
