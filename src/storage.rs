//! RAM backing store for the emulated chip.

/// Fill pattern of erased NAND cells (all-ones).
pub const ERASE_FILL: u8 = 0xFF;

/// Contiguous byte region backing the emulated chip.
///
/// Owned exclusively by the worker thread for the device's lifetime, so
/// there is no locking at this layer; exclusivity is enforced by
/// composition (the device moves the storage into the worker on start).
///
/// Bounds are validated by the worker before any access reaches here, so
/// an out-of-range offset is an engine bug and panics rather than
/// returning a recoverable status.
#[derive(Debug)]
pub struct RamStorage {
    buf: Vec<u8>,
}

impl RamStorage {
    /// Allocate `size` bytes, fully erased.
    ///
    /// A fresh chip reads back the erase pattern everywhere.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            buf: vec![ERASE_FILL; usize::try_from(size).expect("backing size exceeds address space")],
        }
    }

    /// Size of the backing region in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.buf.len() as u64
    }

    /// True for a zero-capacity device.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Read `len` bytes starting at `offset`.
    #[must_use]
    pub fn read(&self, offset: u64, len: usize) -> &[u8] {
        let range = self.range(offset, len as u64);
        &self.buf[range]
    }

    /// Write `data` starting at `offset`.
    pub fn write(&mut self, offset: u64, data: &[u8]) {
        let range = self.range(offset, data.len() as u64);
        self.buf[range].copy_from_slice(data);
    }

    /// Fill `len` bytes starting at `offset` with the erase pattern.
    pub fn erase(&mut self, offset: u64, len: u64) {
        let range = self.range(offset, len);
        self.buf[range].fill(ERASE_FILL);
    }

    fn range(&self, offset: u64, len: u64) -> std::ops::Range<usize> {
        let end = offset.checked_add(len).expect("offset + length overflows");
        assert!(
            end <= self.buf.len() as u64,
            "access [{offset}, {end}) outside backing store of {} bytes",
            self.buf.len()
        );
        offset as usize..end as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_storage_reads_erased() {
        let storage = RamStorage::new(8192);
        assert_eq!(storage.len(), 8192);
        assert!(storage.read(0, 8192).iter().all(|&b| b == ERASE_FILL));
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let mut storage = RamStorage::new(4096);
        let data: Vec<u8> = (0..=255).cycle().take(512).collect();
        storage.write(1024, &data);
        assert_eq!(storage.read(1024, 512), &data[..]);
        // Neighbors untouched.
        assert!(storage.read(0, 1024).iter().all(|&b| b == ERASE_FILL));
        assert!(storage.read(1536, 2560).iter().all(|&b| b == ERASE_FILL));
    }

    #[test]
    fn test_erase_restores_fill_pattern() {
        let mut storage = RamStorage::new(4096);
        storage.write(0, &[0u8; 4096]);
        storage.erase(1024, 2048);
        assert!(storage.read(0, 1024).iter().all(|&b| b == 0));
        assert!(storage.read(1024, 2048).iter().all(|&b| b == ERASE_FILL));
        assert!(storage.read(3072, 1024).iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_capacity() {
        let storage = RamStorage::new(0);
        assert!(storage.is_empty());
        assert_eq!(storage.read(0, 0), &[] as &[u8]);
    }

    #[test]
    #[should_panic(expected = "outside backing store")]
    fn test_read_out_of_bounds_panics() {
        let storage = RamStorage::new(4096);
        let _ = storage.read(4096, 1);
    }

    #[test]
    #[should_panic(expected = "outside backing store")]
    fn test_write_out_of_bounds_panics() {
        let mut storage = RamStorage::new(4096);
        storage.write(4090, &[0u8; 16]);
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn test_offset_overflow_panics() {
        let mut storage = RamStorage::new(4096);
        storage.erase(u64::MAX, 2);
    }
}
