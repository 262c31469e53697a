//! Worker engine: the single execution context that drains the queue.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::badblock::BadBlockTable;
use crate::error::{Error, Result};
use crate::geometry::NandGeometry;
use crate::op::{NandAddr, OpKind, Operation};
use crate::queue::OpQueue;
use crate::storage::RamStorage;

/// Drains the operation queue against the RAM backing store.
///
/// Exactly one worker exists per device and it is the only owner of the
/// [`RamStorage`], so operations execute serially and completions are
/// delivered in strict submission order.
pub(crate) struct Worker {
    geometry: NandGeometry,
    storage: RamStorage,
    queue: Arc<OpQueue>,
    bad_blocks: Arc<BadBlockTable>,
}

impl Worker {
    pub fn new(
        geometry: NandGeometry,
        storage: RamStorage,
        queue: Arc<OpQueue>,
        bad_blocks: Arc<BadBlockTable>,
    ) -> Self {
        Self {
            geometry,
            storage,
            queue,
            bad_blocks,
        }
    }

    /// Run until the queue is dead and drained.
    ///
    /// Once the queue reports dead, every remaining operation is
    /// completed with [`Error::Canceled`] without touching the backing
    /// store; no partial execution is attempted during teardown.
    pub fn run(mut self) {
        while let Some(op) = self.queue.take() {
            if self.queue.is_dead() {
                trace!(op = ?op, "canceling queued operation during drain");
                op.finish(Err(Error::Canceled));
                continue;
            }
            self.execute(op);
        }
        debug!("operation queue drained, worker stopping");
    }

    fn execute(&mut self, mut op: Operation) {
        let result = self
            .validate(&op)
            .and_then(|()| self.perform(&mut op));
        match &result {
            Ok(transferred) => trace!(
                kind = ?op.kind(),
                block = op.addr().block,
                page = op.addr().page,
                transferred,
                "operation complete"
            ),
            Err(err) => warn!(
                kind = ?op.kind(),
                block = op.addr().block,
                page = op.addr().page,
                error = %err,
                "operation failed"
            ),
        }
        op.finish(result);
    }

    /// Check address and length against the geometry, then against the
    /// bad block table. Nothing reaches the backing store on failure.
    fn validate(&self, op: &Operation) -> Result<()> {
        let NandAddr {
            block,
            page,
            column,
        } = op.addr();
        let g = &self.geometry;
        let length = op.length();

        if length == 0 {
            return Err(Error::InvalidArgs("zero-length operation".to_string()));
        }

        match op.kind() {
            OpKind::Read | OpKind::Write => {
                if op.data.len() != length as usize {
                    return Err(Error::InvalidArgs(format!(
                        "buffer of {} bytes does not match declared length {length}",
                        op.data.len()
                    )));
                }
                if block >= g.num_blocks || page >= g.pages_per_block {
                    return Err(Error::InvalidArgs(format!(
                        "page address (block {block}, page {page}) outside geometry \
                         ({} blocks of {} pages)",
                        g.num_blocks, g.pages_per_block
                    )));
                }
                if u64::from(column) + u64::from(length) > u64::from(g.page_size) {
                    return Err(Error::InvalidArgs(format!(
                        "column {column} + length {length} exceeds page size {}",
                        g.page_size
                    )));
                }
                if self.bad_blocks.is_bad(block) {
                    return Err(Error::IoError(format!("block {block} is marked bad")));
                }
            }
            OpKind::Erase => {
                if page != 0 || column != 0 {
                    return Err(Error::InvalidArgs(
                        "erase must be block-aligned (page and column zero)".to_string(),
                    ));
                }
                if u64::from(block) + u64::from(length) > u64::from(g.num_blocks) {
                    return Err(Error::InvalidArgs(format!(
                        "erase of {length} blocks at block {block} exceeds {} blocks",
                        g.num_blocks
                    )));
                }
                if self.bad_blocks.any_bad_in(block, length) {
                    return Err(Error::IoError(format!(
                        "erase range [{block}, {}) covers a bad block",
                        u64::from(block) + u64::from(length)
                    )));
                }
            }
        }
        Ok(())
    }

    fn perform(&mut self, op: &mut Operation) -> Result<u32> {
        let addr = op.addr();
        let offset = self.geometry.byte_offset(addr.block, addr.page, addr.column);
        let length = op.length();
        match op.kind() {
            OpKind::Read => {
                let src = self.storage.read(offset, length as usize);
                op.data.copy_from_slice(src);
            }
            OpKind::Write => self.storage.write(offset, &op.data),
            OpKind::Erase => self
                .storage
                .erase(offset, u64::from(length) * self.geometry.block_size()),
        }
        Ok(length)
    }
}
