//! Error types for persistent-memory operations

use thiserror::Error;

/// Errors surfaced by device-level IO.
///
/// Capacity exhaustion, checksum mismatches, and a region too small for
/// the sentinel are *not* errors: they degrade to `None`, the fallback
/// value, and "not first start" respectively, so record reads always
/// produce a defined value.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("access out of range: offset {offset} + {len} bytes exceeds capacity {capacity}")]
    OutOfRange {
        offset: u32,
        len: usize,
        capacity: u32,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
