//! Data pages: prefix-compressed, sorted key/value records with restart
//! points for binary-searchable seeks.
//!
//! A data page's payload is a sequence of records followed by a
//! little-endian `u32[restart_count]` restart-point offset array and a
//! trailing `u32` restart count. Every [`RESTART_INTERVAL`]-th record is a
//! restart point: it stores its key in full (`prefix_len == 0`) so the
//! cursor can always reconstruct any record's key starting from the nearest
//! preceding restart point without walking further back than that.

use std::cmp::Ordering;

use crate::codec::{decode_fixed32_le, decode_varint32, encode_fixed32_le, encode_varint32, varint_length};
use crate::comparator::Comparator;
use crate::config::PageOptions;
use crate::page::{finish_with_trailer, PageType, PAGE_TRAILER_SIZE};
use crate::LsmError;

/// Every 16th record added is written as a restart point (full key, no
/// prefix compression). This is part of the on-disk format — changing it
/// breaks existing pages.
pub const RESTART_INTERVAL: usize = 16;

/// Builds one data page from a non-decreasing stream of key/value pairs.
///
/// `add` does not verify key order — out-of-order keys produce a page whose
/// prefix compression and seek results are contract-undefined but never
/// unsafe. `finish` consumes the builder, so there is no runtime "already
/// finished" state to violate: the type simply no longer exists afterward.
pub struct DataPageBuilder {
    page_size: usize,
    buffer: Vec<u8>,
    restart_offsets: Vec<u32>,
    record_num: usize,
    last_restart_key: Vec<u8>,
}

impl DataPageBuilder {
    /// Creates an empty builder with the given page options.
    pub fn new(options: PageOptions) -> Self {
        DataPageBuilder {
            page_size: options.page_size,
            buffer: Vec::new(),
            restart_offsets: Vec::new(),
            record_num: 0,
            last_restart_key: Vec::new(),
        }
    }

    /// The configured target page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of records added so far.
    pub fn record_num(&self) -> usize {
        self.record_num
    }

    /// Upper bound on the bytes `add(key, value)` would consume if called
    /// next. The trailing `+4` accounts for the possible new restart-point
    /// slot; callers use this against `page_size` to decide when to rotate
    /// to a new page rather than as an exact size.
    pub fn estimate_entry_size(key: &[u8], value: &[u8]) -> usize {
        varint_length(key.len() as u64)
            + key.len()
            + varint_length(value.len() as u64)
            + value.len()
            + 4
    }

    /// Current size if `finish()` were called right now, including the
    /// restart array, restart count, and framing trailer.
    pub fn estimate_size(&self) -> usize {
        self.buffer.len() + PAGE_TRAILER_SIZE + 4 + (1 + self.restart_offsets.len()) * 4
    }

    /// Appends one record. `key` must be `>=` every previously added key
    /// under whatever comparator will later read this page.
    pub fn add(&mut self, key: &[u8], value: &[u8]) {
        let (prefix_len, suffix_len) = if self.record_num % RESTART_INTERVAL == 0 {
            self.restart_offsets.push(self.buffer.len() as u32);
            self.last_restart_key.clear();
            self.last_restart_key.extend_from_slice(key);
            (0, key.len())
        } else {
            let prefix_len = common_prefix(key, &self.last_restart_key);
            (prefix_len, key.len() - prefix_len)
        };

        encode_varint32(&mut self.buffer, prefix_len as u32);
        encode_varint32(&mut self.buffer, suffix_len as u32);
        encode_varint32(&mut self.buffer, value.len() as u32);
        self.buffer.extend_from_slice(&key[prefix_len..]);
        self.buffer.extend_from_slice(value);
        self.record_num += 1;
    }

    /// Finalizes the page: appends the restart-point array, the restart
    /// count, and the framing trailer.
    pub fn finish(mut self) -> Vec<u8> {
        for offset in &self.restart_offsets {
            encode_fixed32_le(&mut self.buffer, *offset);
        }
        encode_fixed32_le(&mut self.buffer, self.restart_offsets.len() as u32);
        finish_with_trailer(self.buffer, PageType::Data)
    }
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Forward/backward/seek cursor over a finalized data page.
///
/// Constructed from the full page byte slice (trailer included) plus the
/// comparator the page was built under. The slices returned by `key()` and
/// `value()` borrow a scratch buffer owned by the cursor and stay valid
/// until the next call that takes `&mut self`.
pub struct DataPageCursor<'a> {
    payload: &'a [u8],
    comparator: &'a dyn Comparator,
    restart_start: usize,
    restart_count: usize,
    cur: usize,
    cur_restart: usize,
    key_buf: Vec<u8>,
    value_buf: Vec<u8>,
}

impl<'a> DataPageCursor<'a> {
    /// Opens a cursor over `page`. Does not check the page's CRC — callers
    /// should validate with [`PageReader::check_crc32c`](crate::page::PageReader::check_crc32c)
    /// first. Fails if the page is too short to plausibly hold a restart
    /// array and count.
    pub fn new(page: &'a [u8], comparator: &'a dyn Comparator) -> Result<Self, LsmError> {
        if page.len() < PAGE_TRAILER_SIZE {
            return Err(LsmError::Corruption("page shorter than trailer".into()));
        }
        let payload = &page[..page.len() - PAGE_TRAILER_SIZE];
        if payload.len() < 4 {
            return Err(LsmError::Corruption(
                "data page payload missing restart count".into(),
            ));
        }
        let restart_count = decode_fixed32_le(&payload[payload.len() - 4..]) as usize;
        let restart_array_bytes = restart_count
            .checked_mul(4)
            .ok_or_else(|| LsmError::Corruption("restart count overflow".into()))?;
        if restart_array_bytes + 4 > payload.len() {
            return Err(LsmError::Corruption(
                "restart point array overruns payload".into(),
            ));
        }
        let restart_start = payload.len() - 4 - restart_array_bytes;

        Ok(DataPageCursor {
            payload,
            comparator,
            restart_start,
            restart_count,
            cur: 0,
            cur_restart: 0,
            key_buf: Vec::new(),
            value_buf: Vec::new(),
        })
    }

    /// `true` if the cursor currently sits on a record.
    pub fn valid(&self) -> bool {
        self.cur < self.restart_start
    }

    fn invalidate(&mut self) {
        self.cur = self.restart_start;
    }

    /// Positions at the first record, or invalid if the page is empty.
    pub fn seek_to_first(&mut self) {
        self.cur = 0;
        self.cur_restart = 0;
    }

    /// Positions at the last record, or invalid if the page is empty.
    pub fn seek_to_last(&mut self) {
        if self.restart_count == 0 {
            self.invalidate();
            return;
        }
        self.cur_restart = self.restart_count - 1;
        let mut entry = self.restart_offset(self.cur_restart);
        while let Some(size) = self.record_size(entry) {
            if entry + size >= self.restart_start {
                break;
            }
            entry += size;
        }
        self.cur = entry;
    }

    /// Advances to the next record, or becomes invalid if already at the
    /// last one. No-op if already invalid.
    pub fn next(&mut self) {
        if !self.valid() {
            return;
        }
        match self.record_size(self.cur) {
            Some(size) => {
                self.cur += size;
                if self.cur_restart + 1 < self.restart_count
                    && self.cur == self.restart_offset(self.cur_restart + 1)
                {
                    self.cur_restart += 1;
                }
            }
            None => self.invalidate(),
        }
    }

    /// Moves to the previous record. Calling `prev()` at the first record
    /// invalidates the cursor; calling it again while invalid is a no-op —
    /// past-the-beginning does not wrap to the last record.
    pub fn prev(&mut self) {
        if !self.valid() {
            return;
        }
        if self.cur == 0 {
            self.invalidate();
            return;
        }
        if self.cur == self.restart_offset(self.cur_restart) {
            self.cur_restart -= 1;
        }
        let mut entry = self.restart_offset(self.cur_restart);
        while let Some(size) = self.record_size(entry) {
            if entry + size >= self.cur {
                break;
            }
            entry += size;
        }
        self.cur = entry;
    }

    /// Positions at the first record whose key is `>= target`, or invalid
    /// if no such record exists.
    pub fn seek(&mut self, target: &[u8]) {
        if self.restart_count == 0 {
            self.invalidate();
            return;
        }

        // Lower bound over restart-point keys: smallest index whose key is
        // >= target (== restart_count if none qualify).
        let mut lo = 0usize;
        let mut hi = self.restart_count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let key = self.restart_key(mid);
            if self.comparator.compare(key, target) == Ordering::Less {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        // This single rule covers both "target precedes every restart key"
        // (lo == 0) and "target exceeds every restart key" (lo ==
        // restart_count, so lo - 1 is the last restart point) without a
        // separate branch for the latter.
        let start_restart = if lo == 0 { 0 } else { lo - 1 };
        self.cur_restart = start_restart;
        self.cur = self.restart_offset(start_restart);

        let cmp = self.comparator;
        while self.valid() {
            if cmp.compare(self.key(), target) != Ordering::Less {
                break;
            }
            self.next();
        }
    }

    /// The reconstructed key of the current record.
    ///
    /// Panics-free: if the page has been corrupted past what
    /// `check_crc32c` would catch, returns whatever partial key could be
    /// decoded rather than panicking.
    pub fn key(&mut self) -> &[u8] {
        self.key_buf.clear();
        if let Some((prefix_len, suffix_len, _, header_len)) = self.record_span(self.cur) {
            let restart_key = self.restart_key(self.cur_restart);
            let prefix_len = prefix_len.min(restart_key.len());
            self.key_buf.extend_from_slice(&restart_key[..prefix_len]);
            let suffix_start = self.cur + header_len;
            if let Some(suffix) = self.payload.get(suffix_start..suffix_start + suffix_len) {
                self.key_buf.extend_from_slice(suffix);
            }
        }
        &self.key_buf
    }

    /// The value of the current record.
    pub fn value(&mut self) -> &[u8] {
        self.value_buf.clear();
        if let Some((_, suffix_len, value_len, header_len)) = self.record_span(self.cur) {
            let value_start = self.cur + header_len + suffix_len;
            if let Some(value) = self.payload.get(value_start..value_start + value_len) {
                self.value_buf.extend_from_slice(value);
            }
        }
        &self.value_buf
    }

    fn restart_offset(&self, restart_index: usize) -> usize {
        let off = self.restart_start + restart_index * 4;
        decode_fixed32_le(&self.payload[off..off + 4]) as usize
    }

    /// The full key stored at restart point `restart_index` (restart
    /// records always have `prefix_len == 0`, so no reconstruction needed).
    fn restart_key(&self, restart_index: usize) -> &'a [u8] {
        let entry = self.restart_offset(restart_index);
        match self.record_span(entry) {
            Some((_, suffix_len, _, header_len)) => self
                .payload
                .get(entry + header_len..entry + header_len + suffix_len)
                .unwrap_or(b""),
            None => b"",
        }
    }

    /// Parses the three leading varints of the record at `offset`.
    /// Returns `(prefix_len, suffix_len, value_len, header_len)`, or `None`
    /// if a varint could not be decoded (truncated/corrupt record).
    fn record_span(&self, offset: usize) -> Option<(usize, usize, usize, usize)> {
        let buf = self.payload.get(offset..)?;
        let (prefix_len, n1) = decode_varint32(buf)?;
        let (suffix_len, n2) = decode_varint32(buf.get(n1..)?)?;
        let (value_len, n3) = decode_varint32(buf.get(n1 + n2..)?)?;
        Some((
            prefix_len as usize,
            suffix_len as usize,
            value_len as usize,
            n1 + n2 + n3,
        ))
    }

    fn record_size(&self, offset: usize) -> Option<usize> {
        self.record_span(offset)
            .map(|(_, suffix_len, value_len, header_len)| header_len + suffix_len + value_len)
    }
}
