//! Device backends for the persistent-memory region
//!
//! The storage layer depends only on [`MemoryDevice`], never on device
//! identity. Two backends ship with the crate: [`RamDevice`] (an
//! in-memory region for tests and emulation) and [`FileDevice`] (a
//! plain file treated as the region).

use crate::error::{Result, StoreError};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Raw byte read/write/commit primitives over a fixed-capacity region.
///
/// All offsets are absolute region addresses in `[0, capacity)`.
/// `activate` runs lazily, once, before the first IO operation;
/// `commit` runs after every write. Both default to no-ops for devices
/// that need neither.
pub trait MemoryDevice {
    /// Region capacity in bytes.
    fn capacity(&self) -> u32;

    /// Fill `buf` from the region starting at `offset`.
    fn read_bytes(&mut self, offset: u32, buf: &mut [u8]) -> Result<()>;

    /// Write `data` to the region starting at `offset`.
    fn write_bytes(&mut self, offset: u32, data: &[u8]) -> Result<()>;

    /// Session start for devices that require it before capacity/IO are
    /// valid.
    fn activate(&mut self, _size_hint: u32) -> Result<()> {
        Ok(())
    }

    /// Flush buffered writes for devices that buffer them.
    fn commit(&mut self) -> Result<()> {
        Ok(())
    }
}

fn check_span(offset: u32, len: usize, capacity: u32) -> Result<()> {
    let end = offset as u64 + len as u64;
    if end > capacity as u64 {
        return Err(StoreError::OutOfRange {
            offset,
            len,
            capacity,
        });
    }
    Ok(())
}

/// In-memory region, zero-initialized.
///
/// Doubles as the corruption-injection vehicle in tests: `bytes_mut`
/// exposes the raw cells.
#[derive(Debug, Clone)]
pub struct RamDevice {
    cells: Vec<u8>,
}

impl RamDevice {
    pub fn new(capacity: u32) -> Self {
        RamDevice {
            cells: vec![0u8; capacity as usize],
        }
    }

    /// Raw view of the region.
    pub fn bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Mutable raw view of the region.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }
}

impl MemoryDevice for RamDevice {
    fn capacity(&self) -> u32 {
        self.cells.len() as u32
    }

    fn read_bytes(&mut self, offset: u32, buf: &mut [u8]) -> Result<()> {
        check_span(offset, buf.len(), self.capacity())?;
        let start = offset as usize;
        buf.copy_from_slice(&self.cells[start..start + buf.len()]);
        Ok(())
    }

    fn write_bytes(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        check_span(offset, data.len(), self.capacity())?;
        let start = offset as usize;
        self.cells[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }
}

/// File-backed region with a fixed capacity.
///
/// Writes are buffered by the OS until `commit`, which flushes and
/// syncs. A freshly created region is zero-filled so first-start
/// detection sees deterministic contents.
pub struct FileDevice {
    file: File,
    capacity: u32,
    path: PathBuf,
}

impl FileDevice {
    /// Create a new zero-filled region file, truncating any existing
    /// file at `path`.
    pub fn create<P: AsRef<Path>>(path: P, capacity: u32) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        file.write_all(&vec![0u8; capacity as usize])?;
        file.flush()?;

        Ok(FileDevice {
            file,
            capacity,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Open an existing region file; capacity is the file length.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let capacity = file.metadata()?.len().min(u32::MAX as u64) as u32;

        Ok(FileDevice {
            file,
            capacity,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Path of the backing region file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MemoryDevice for FileDevice {
    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn read_bytes(&mut self, offset: u32, buf: &mut [u8]) -> Result<()> {
        check_span(offset, buf.len(), self.capacity)?;
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write_bytes(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        check_span(offset, data.len(), self.capacity)?;
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(data)?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_ram_read_write() {
        let mut dev = RamDevice::new(16);
        dev.write_bytes(4, b"abcd").unwrap();

        let mut buf = [0u8; 4];
        dev.read_bytes(4, &mut buf).unwrap();
        assert_eq!(&buf, b"abcd");

        // Untouched cells stay zero
        assert_eq!(dev.bytes()[0], 0);
        assert_eq!(dev.bytes()[8], 0);
    }

    #[test]
    fn test_ram_out_of_range() {
        let mut dev = RamDevice::new(8);
        let result = dev.write_bytes(6, b"abcd");
        assert!(matches!(result, Err(StoreError::OutOfRange { .. })));

        let mut buf = [0u8; 4];
        let result = dev.read_bytes(5, &mut buf);
        assert!(matches!(result, Err(StoreError::OutOfRange { .. })));
    }

    #[test]
    fn test_file_create_and_read_back() {
        let temp = NamedTempFile::new().unwrap();
        let mut dev = FileDevice::create(temp.path(), 64).unwrap();
        assert_eq!(dev.capacity(), 64);

        dev.write_bytes(10, b"hello").unwrap();
        dev.commit().unwrap();

        let mut buf = [0u8; 5];
        dev.read_bytes(10, &mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn test_file_open_existing() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().to_path_buf();

        {
            let mut dev = FileDevice::create(&path, 32).unwrap();
            dev.write_bytes(0, &[0xAA, 0xBB]).unwrap();
            dev.commit().unwrap();
        }

        let mut dev = FileDevice::open(&path).unwrap();
        assert_eq!(dev.capacity(), 32);
        assert_eq!(dev.path(), path);

        let mut buf = [0u8; 2];
        dev.read_bytes(0, &mut buf).unwrap();
        assert_eq!(buf, [0xAA, 0xBB]);
    }

    #[test]
    fn test_file_fresh_region_is_zeroed() {
        let temp = NamedTempFile::new().unwrap();
        let mut dev = FileDevice::create(temp.path(), 16).unwrap();

        let mut buf = [0xFFu8; 16];
        dev.read_bytes(0, &mut buf).unwrap();
        assert_eq!(buf, [0u8; 16]);
    }
}
