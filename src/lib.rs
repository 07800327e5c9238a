//! # nvstore - Durable Records for Raw Persistent Memory
//!
//! `nvstore` stores small fixed-size and variable-length values in a
//! byte-addressable persistent memory region (EEPROM, FRAM, an emulated
//! flash page, or a plain file standing in for one) that has no
//! filesystem and no atomic multi-byte writes:
//!
//! - **Monotonic byte-range allocation** over the region, with no
//!   central registry of variables
//! - **First-start detection** via a 16-bit sentinel, so default values
//!   are written exactly once per region lifetime
//! - **Checksum-guarded typed records** that fall back to a
//!   caller-supplied value instead of trusting stale or torn bytes
//! - **Bounded NUL-terminated strings** with truncating writes
//!
//! ## Quick Start
//!
//! ```rust
//! use nvstore::{RamDevice, RecordStore, Region, Result, StringStore};
//!
//! # fn main() -> Result<()> {
//! let mut region = Region::new(RamDevice::new(64));
//!
//! // First boot writes the initial values; later boots keep whatever
//! // was last persisted.
//! let boots = RecordStore::new(&mut region, 0u32)?;
//! let name = StringStore::new(&mut region, 16, "unnamed")?;
//!
//! let count = boots.read(&mut region);
//! boots.write(&mut region, &(count + 1))?;
//!
//! assert_eq!(name.read(&mut region), "unnamed");
//! # Ok(())
//! # }
//! ```
//!
//! ## Layout is construction order
//!
//! The persisted layout is determined entirely by the sequence of store
//! constructions: bytes `[0, 2)` hold the sentinel, and each store
//! occupies the next `size + 1` (records) or `max_len` (strings) bytes
//! in construction order. Reordering, inserting, or resizing stores
//! between builds silently shifts every later offset and invalidates
//! previously persisted data; there is no migration mechanism. Keep the
//! construction sequence fixed across boots.
//!
//! ## Failure model
//!
//! Nothing here panics or aborts: a full region turns the affected
//! store into a safe no-op that reads as its fallback, a failed
//! checksum reads as the fallback, and a region too small for the
//! sentinel is treated as already initialized so unknown data is never
//! clobbered. Only real device IO faults surface, as [`StoreError`].

pub mod cached;
pub mod device;
pub mod error;
pub mod record;
pub mod region;
pub mod storable;
pub mod text;

pub use cached::CachedRecord;
pub use device::{FileDevice, MemoryDevice, RamDevice};
pub use error::{Result, StoreError};
pub use record::RecordStore;
pub use region::{Region, SENTINEL, SENTINEL_LEN};
pub use storable::Storable;
pub use text::StringStore;
