//! Region allocator and first-start detection
//!
//! A [`Region`] owns the device and hands out non-overlapping,
//! monotonically increasing byte ranges. The first two bytes of every
//! region are permanently reserved for the first-start sentinel.
//!
//! The persisted layout is determined entirely by allocation order:
//! constructing stores in a different order on the next boot silently
//! shifts every offset and invalidates previously written data. There
//! is no migration mechanism; keep construction order fixed.

use crate::device::MemoryDevice;
use crate::error::Result;
use tracing::{debug, warn};

/// Magic value stamped at offset 0 the first time a region is touched.
pub const SENTINEL: u16 = 0x3159;

/// Bytes reserved at the start of the region for the sentinel.
pub const SENTINEL_LEN: u32 = 2;

/// A fixed-capacity persistent-memory region with a monotonic
/// byte-range allocator.
///
/// There is no reclamation: once a range is handed out it stays
/// reserved for the life of the process. Single-threaded; no interior
/// locking.
pub struct Region<D> {
    device: D,
    cursor: u32,
    first_start: Option<bool>,
    activated: bool,
}

impl<D: MemoryDevice> Region<D> {
    /// Wrap a device. The allocation cursor starts past the sentinel
    /// reservation; no IO happens until the first store is constructed.
    pub fn new(device: D) -> Self {
        Region {
            device,
            cursor: SENTINEL_LEN,
            first_start: None,
            activated: false,
        }
    }

    /// Region capacity in bytes, as reported by the device.
    pub fn capacity(&self) -> u32 {
        self.device.capacity()
    }

    /// Bytes consumed by allocations so far, sentinel included.
    ///
    /// Can exceed `capacity` after a failed allocation, since the
    /// cursor advances even on overflow.
    pub fn used_bytes(&self) -> u32 {
        self.cursor
    }

    /// Bytes still available for allocation, floored at 0.
    pub fn free_bytes(&self) -> u32 {
        self.device.capacity().saturating_sub(self.cursor)
    }

    /// Reserve `size` bytes and return their starting offset, or `None`
    /// if the range would exceed capacity.
    ///
    /// The cursor advances even when the request overflows, so once one
    /// allocation fails every subsequent allocation fails too. A
    /// store's offset therefore depends only on the sizes requested
    /// before it, never on which of those requests succeeded, and the
    /// persisted layout stays stable across boots that hit capacity.
    pub fn allocate(&mut self, size: u32) -> Option<u32> {
        let offset = self.cursor;
        self.cursor = self.cursor.saturating_add(size);

        if self.cursor > self.device.capacity() {
            warn!(
                "allocation of {} bytes at offset {} exceeds capacity {}",
                size,
                offset,
                self.device.capacity()
            );
            return None;
        }

        debug!("allocated [{}, {})", offset, self.cursor);
        Some(offset)
    }

    /// Report whether this region has never been stamped by this
    /// protocol, stamping it in the process.
    ///
    /// The decision is made once and memoized: the sentinel bytes are
    /// overwritten on a first start, so a re-read would disagree with
    /// the first answer within the same boot. A region too small to
    /// hold the sentinel always reports `false` without touching
    /// storage (never clobber unknown-format data when there is no room
    /// for the test).
    pub fn is_first_start(&mut self) -> Result<bool> {
        if let Some(decided) = self.first_start {
            return Ok(decided);
        }

        let decided = if self.device.capacity() < SENTINEL_LEN {
            false
        } else {
            let mut raw = [0u8; SENTINEL_LEN as usize];
            self.read(0, &mut raw)?;

            if u16::from_le_bytes(raw) != SENTINEL {
                debug!("sentinel missing, stamping region as initialized");
                self.write(0, &SENTINEL.to_le_bytes())?;
                true
            } else {
                false
            }
        };

        self.first_start = Some(decided);
        Ok(decided)
    }

    /// Read `buf.len()` bytes starting at `offset`.
    pub(crate) fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<()> {
        self.ensure_active()?;
        self.device.read_bytes(offset, buf)
    }

    /// Write `data` starting at `offset`, committing afterwards for
    /// devices that buffer.
    pub(crate) fn write(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        self.ensure_active()?;
        self.device.write_bytes(offset, data)?;
        self.device.commit()
    }

    fn ensure_active(&mut self) -> Result<()> {
        if !self.activated {
            self.device.activate(self.device.capacity())?;
            self.activated = true;
        }
        Ok(())
    }

    /// Access the underlying device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable access to the underlying device.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Consume the region, returning the device.
    pub fn into_device(self) -> D {
        self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::RamDevice;

    #[test]
    fn test_cursor_starts_past_sentinel() {
        let region = Region::new(RamDevice::new(64));
        assert_eq!(region.used_bytes(), SENTINEL_LEN);
        assert_eq!(region.free_bytes(), 62);
    }

    #[test]
    fn test_allocations_are_monotonic_and_adjacent() {
        let mut region = Region::new(RamDevice::new(64));

        let o1 = region.allocate(10).unwrap();
        let o2 = region.allocate(5).unwrap();
        let o3 = region.allocate(1).unwrap();

        assert_eq!(o1, 2);
        assert_eq!(o2, o1 + 10);
        assert_eq!(o3, o2 + 5);
        assert_eq!(region.used_bytes(), 18);
        assert_eq!(region.free_bytes() + region.used_bytes(), 64);
    }

    #[test]
    fn test_allocation_overflow_advances_cursor() {
        let mut region = Region::new(RamDevice::new(16));

        assert!(region.allocate(10).is_some()); // [2, 12)
        assert!(region.allocate(10).is_none()); // would end at 22

        // Cursor consumed the failed request, so even a small
        // follow-up request fails.
        assert_eq!(region.used_bytes(), 22);
        assert_eq!(region.free_bytes(), 0);
        assert!(region.allocate(1).is_none());
    }

    #[test]
    fn test_exact_fit_allocation_succeeds() {
        let mut region = Region::new(RamDevice::new(16));
        let offset = region.allocate(14).unwrap();
        assert_eq!(offset, 2);
        assert_eq!(region.free_bytes(), 0);
    }

    #[test]
    fn test_first_start_on_fresh_region() {
        let mut region = Region::new(RamDevice::new(16));
        assert!(region.is_first_start().unwrap());

        // Memoized: same answer within the same boot even though the
        // sentinel is now stamped.
        assert!(region.is_first_start().unwrap());
        assert_eq!(
            &region.device().bytes()[..2],
            &SENTINEL.to_le_bytes()
        );
    }

    #[test]
    fn test_not_first_start_on_stamped_region() {
        let mut device = RamDevice::new(16);
        device.bytes_mut()[..2].copy_from_slice(&SENTINEL.to_le_bytes());

        let mut region = Region::new(device);
        assert!(!region.is_first_start().unwrap());
    }

    #[test]
    fn test_mismatched_sentinel_counts_as_first_start() {
        let mut device = RamDevice::new(16);
        device.bytes_mut()[..2].copy_from_slice(&0xFFFFu16.to_le_bytes());

        let mut region = Region::new(device);
        assert!(region.is_first_start().unwrap());
        assert_eq!(
            &region.device().bytes()[..2],
            &SENTINEL.to_le_bytes()
        );
    }

    #[test]
    fn test_region_too_small_for_sentinel() {
        let mut region = Region::new(RamDevice::new(1));
        assert!(!region.is_first_start().unwrap());

        // Storage untouched
        assert_eq!(region.device().bytes(), &[0]);
    }
}
