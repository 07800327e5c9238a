//! Bounded NUL-terminated string storage
//!
//! A string record occupies exactly `max_len` bytes. Writes truncate to
//! fit; when a string is truncated the terminator is dropped in
//! storage, which is accepted layout behavior. Reads always terminate
//! at the first NUL or at `max_len`, so the returned string is bounded
//! regardless of persisted content.

use crate::device::MemoryDevice;
use crate::error::Result;
use crate::region::Region;
use tracing::warn;

/// A capped-length text record at a fixed offset.
///
/// Useful strings hold at most `max_len - 1` bytes of content; the last
/// byte is normally the terminator. No integrity byte is kept for text
/// records.
pub struct StringStore {
    offset: Option<u32>,
    max_len: usize,
}

impl StringStore {
    /// Reserve `max_len` bytes and, on first start, persist `initial`
    /// (truncated to fit).
    pub fn new<D: MemoryDevice>(
        region: &mut Region<D>,
        max_len: usize,
        initial: &str,
    ) -> Result<Self> {
        let offset = region.allocate(max_len as u32);
        let store = StringStore { offset, max_len };

        if region.is_first_start()? {
            store.write(region, initial)?;
        }

        Ok(store)
    }

    /// Persist `text`, truncated to fit the reserved span. The
    /// terminator is included when it fits. Safe no-op if allocation
    /// failed at construction.
    pub fn write<D: MemoryDevice>(&self, region: &mut Region<D>, text: &str) -> Result<()> {
        let Some(offset) = self.offset else {
            return Ok(());
        };

        let bytes = text.as_bytes();
        // strlen + terminator, capped at the reserved span
        let span = (bytes.len() + 1).min(self.max_len);
        let content = span.min(bytes.len());

        let mut buf = vec![0u8; span];
        buf[..content].copy_from_slice(&bytes[..content]);

        region.write(offset, &buf)
    }

    /// Read the record. Scans the reserved span and stops at the first
    /// NUL; the last byte of the span is always treated as the
    /// terminator boundary, so the result holds at most `max_len - 1`
    /// bytes of content even when the persisted bytes contain no NUL.
    /// Returns an empty string when allocation failed at construction
    /// or the device read fails. Never fails.
    pub fn read<D: MemoryDevice>(&self, region: &mut Region<D>) -> String {
        let Some(offset) = self.offset else {
            return String::new();
        };

        let mut buf = vec![0u8; self.max_len];
        if let Err(e) = region.read(offset, &mut buf) {
            warn!("string read at offset {} failed: {}", offset, e);
            return String::new();
        }

        let limit = self.max_len.saturating_sub(1);
        let end = buf[..limit].iter().position(|&b| b == 0).unwrap_or(limit);
        buf.truncate(end);

        String::from_utf8_lossy(&buf).into_owned()
    }

    /// The reserved offset, or `None` if the region was full.
    pub fn offset(&self) -> Option<u32> {
        self.offset
    }

    /// The reserved span in bytes.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}
