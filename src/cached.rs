//! In-memory cached record handle
//!
//! [`CachedRecord`] mirrors one checksummed record in memory so hot
//! paths touch RAM instead of the device. Persistence is explicit:
//! nothing synchronizes the two copies except `save` and `load`.

use crate::device::MemoryDevice;
use crate::error::Result;
use crate::record::RecordStore;
use crate::region::Region;
use crate::storable::Storable;
use std::ops::{Deref, DerefMut};

/// A record store plus an in-memory copy of its value.
///
/// Construction persists `initial` on first start and then loads the
/// in-memory copy back from storage, so on later boots the cached value
/// is the checksum-validated persisted value, not the constructor
/// argument.
pub struct CachedRecord<T: Storable + Clone> {
    store: RecordStore<T>,
    value: T,
}

impl<T: Storable + Clone + Default> CachedRecord<T> {
    pub fn new<D: MemoryDevice>(region: &mut Region<D>, initial: T) -> Result<Self> {
        let store = RecordStore::new(region, initial)?;
        let value = store.read(region);
        Ok(CachedRecord { store, value })
    }
}

impl<T: Storable + Clone> CachedRecord<T> {
    /// Like `new`, with an explicit fallback for corrupted reads.
    pub fn with_fallback<D: MemoryDevice>(
        region: &mut Region<D>,
        initial: T,
        fallback: T,
    ) -> Result<Self> {
        let store = RecordStore::with_fallback(region, initial, fallback)?;
        let value = store.read(region);
        Ok(CachedRecord { store, value })
    }

    /// Persist the in-memory value.
    pub fn save<D: MemoryDevice>(&self, region: &mut Region<D>) -> Result<()> {
        self.store.write(region, &self.value)
    }

    /// Overwrite the in-memory value from storage.
    pub fn load<D: MemoryDevice>(&mut self, region: &mut Region<D>) {
        self.value = self.store.read(region);
    }

    /// The underlying record store.
    pub fn store(&self) -> &RecordStore<T> {
        &self.store
    }
}

impl<T: Storable + Clone> Deref for CachedRecord<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Storable + Clone> DerefMut for CachedRecord<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}
