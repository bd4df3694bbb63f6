//! CRC32-C (Castagnoli) checksum, used by every page trailer.

/// Computes the CRC32-C checksum of `bytes`.
///
/// This is a thin wrapper over the `crc32c` crate's hardware-accelerated
/// implementation; it exists as its own module because the page format
/// treats "CRC32-C over a byte range" as a named primitive independent of
/// page framing.
pub fn crc32c(bytes: &[u8]) -> u32 {
    crc32c::crc32c(bytes)
}
