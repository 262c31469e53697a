//! NAND device geometry.

/// Immutable description of the emulated chip's layout.
///
/// All four fields are fixed at construction. An all-zero geometry is a
/// valid zero-capacity device, not an error; callers that need capacity
/// must check [`NandGeometry::total_size`] themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NandGeometry {
    /// Bytes per page.
    pub page_size: u32,
    /// Pages per erase block.
    pub pages_per_block: u32,
    /// Total erase blocks on the chip.
    pub num_blocks: u32,
    /// ECC bits the emulated controller claims to correct. Carried for
    /// callers that size out-of-band data; the emulator computes no ECC.
    pub ecc_bits: u32,
}

impl NandGeometry {
    /// Create a geometry from its four parameters.
    #[must_use]
    pub const fn new(page_size: u32, pages_per_block: u32, num_blocks: u32, ecc_bits: u32) -> Self {
        Self {
            page_size,
            pages_per_block,
            num_blocks,
            ecc_bits,
        }
    }

    /// Total addressable bytes.
    ///
    /// Fields are widened to u64 before multiplying so 32-bit geometries
    /// cannot overflow.
    #[must_use]
    pub const fn total_size(&self) -> u64 {
        self.page_size as u64 * self.pages_per_block as u64 * self.num_blocks as u64
    }

    /// Bytes per erase block.
    #[must_use]
    pub const fn block_size(&self) -> u64 {
        self.page_size as u64 * self.pages_per_block as u64
    }

    /// Linear byte offset of `(block, page, column)` in the backing store.
    ///
    /// Callers validate the coordinates against the geometry first; the
    /// arithmetic itself cannot overflow u64.
    #[must_use]
    pub const fn byte_offset(&self, block: u32, page: u32, column: u32) -> u64 {
        (block as u64 * self.pages_per_block as u64 + page as u64) * self.page_size as u64
            + column as u64
    }
}
