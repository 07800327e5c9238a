//! Checksummed fixed-size record storage
//!
//! Each record occupies `T::SIZE + 1` bytes: the little-endian value
//! bytes followed by an additive mod-256 checksum. The checksum is the
//! sole integrity gate; it catches uninitialized memory, partial writes
//! from power loss, and single-byte rot, but not every multi-byte
//! pattern (it is a sum, not a CRC).

use crate::device::MemoryDevice;
use crate::error::Result;
use crate::region::Region;
use crate::storable::Storable;
use tracing::warn;

/// Additive checksum over the value bytes.
pub(crate) fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// A fixed-size value stored at a fixed offset with a trailing checksum
/// byte.
///
/// The offset is reserved once, at construction; if the region was full
/// the store holds no offset and degrades to safe no-ops (writes) and
/// the fallback value (reads).
///
/// Note that a record whose value bytes are all zero checksums to zero,
/// so never-written zeroed memory validates as the zero value. That is
/// inherent to the layout.
pub struct RecordStore<T: Storable> {
    offset: Option<u32>,
    fallback: T,
}

impl<T: Storable + Clone + Default> RecordStore<T> {
    /// Reserve space for one record and, on first start, persist
    /// `initial`. Corrupted reads fall back to `T::default()`.
    pub fn new<D: MemoryDevice>(region: &mut Region<D>, initial: T) -> Result<Self> {
        Self::with_fallback(region, initial, T::default())
    }
}

impl<T: Storable + Clone> RecordStore<T> {
    /// Reserve space for one record with an explicit fallback for
    /// corrupted reads. On first start, `initial` is persisted
    /// immediately.
    pub fn with_fallback<D: MemoryDevice>(
        region: &mut Region<D>,
        initial: T,
        fallback: T,
    ) -> Result<Self> {
        let offset = region.allocate(T::SIZE as u32 + 1);
        let store = RecordStore { offset, fallback };

        if region.is_first_start()? {
            store.write(region, &initial)?;
        }

        Ok(store)
    }

    /// Persist `value` with its checksum. Safe no-op if allocation
    /// failed at construction.
    pub fn write<D: MemoryDevice>(&self, region: &mut Region<D>, value: &T) -> Result<()> {
        let Some(offset) = self.offset else {
            return Ok(());
        };

        let mut block = vec![0u8; T::SIZE + 1];
        value.put(&mut block[..T::SIZE]);
        block[T::SIZE] = checksum(&block[..T::SIZE]);

        region.write(offset, &block)
    }

    /// Read the record, validating the checksum. Returns the fallback
    /// value on mismatch, on device read failure, or when allocation
    /// failed at construction. Never fails.
    pub fn read<D: MemoryDevice>(&self, region: &mut Region<D>) -> T {
        let Some(offset) = self.offset else {
            return self.fallback.clone();
        };

        let mut block = vec![0u8; T::SIZE + 1];
        if let Err(e) = region.read(offset, &mut block) {
            warn!("record read at offset {} failed: {}", offset, e);
            return self.fallback.clone();
        }

        if checksum(&block[..T::SIZE]) != block[T::SIZE] {
            warn!("checksum mismatch at offset {}, using fallback", offset);
            return self.fallback.clone();
        }

        T::take(&block[..T::SIZE])
    }

    /// The reserved offset, or `None` if the region was full.
    pub fn offset(&self) -> Option<u32> {
        self.offset
    }

    /// The value substituted for corrupted or unreadable records.
    pub fn fallback(&self) -> &T {
        &self.fallback
    }
}
