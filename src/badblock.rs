//! Bad block bookkeeping.

use parking_lot::RwLock;
use rustc_hash::FxHashSet;

/// Set of blocks flagged unusable.
///
/// Bad blocks are declared by an external caller, never auto-populated by
/// the worker. The table is internally synchronized so administrative
/// queries can interleave freely with the worker's per-operation checks.
#[derive(Debug, Default)]
pub struct BadBlockTable {
    blocks: RwLock<FxHashSet<u32>>,
}

impl BadBlockTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag `block` as bad. Marking an already-bad block is a no-op.
    pub fn mark_bad(&self, block: u32) {
        self.blocks.write().insert(block);
    }

    /// True if `block` has been flagged bad.
    #[must_use]
    pub fn is_bad(&self, block: u32) -> bool {
        self.blocks.read().contains(&block)
    }

    /// True if any block in `[first, first + count)` is flagged bad.
    #[must_use]
    pub fn any_bad_in(&self, first: u32, count: u32) -> bool {
        let blocks = self.blocks.read();
        (first..first.saturating_add(count)).any(|b| blocks.contains(&b))
    }

    /// Number of blocks currently flagged bad.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.blocks.read().len() as u32
    }

    /// List bad blocks, sorted ascending and truncated to `capacity`
    /// entries. The second value is the true total, so a caller can
    /// detect truncation and retry with a larger capacity.
    #[must_use]
    pub fn list(&self, capacity: usize) -> (Vec<u32>, u32) {
        let blocks = self.blocks.read();
        let total = blocks.len() as u32;
        let mut sorted: Vec<u32> = blocks.iter().copied().collect();
        drop(blocks);
        sorted.sort_unstable();
        sorted.truncate(capacity);
        (sorted, total)
    }
}
