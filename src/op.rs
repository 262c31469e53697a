//! Queued operations and their completion channel.

use std::fmt;

use crate::error::Result;

/// Physical target of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NandAddr {
    /// Erase block index.
    pub block: u32,
    /// Page index within the block.
    pub page: u32,
    /// Byte offset within the page.
    pub column: u32,
}

/// What an operation does to the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Copy bytes out of a page.
    Read,
    /// Copy bytes into a page.
    Write,
    /// Reset whole blocks to the erase pattern.
    Erase,
}

/// Terminal report delivered to the submitter, exactly once per
/// operation.
pub struct OpCompletion {
    /// Transferred length on success: bytes for read/write, blocks for
    /// erase. Failures carry the per-operation error.
    pub result: Result<u32>,
    /// The caller's buffer, handed back. Read data lands here; for write
    /// and erase it is returned unchanged.
    pub data: Vec<u8>,
}

type CompleteFn = Box<dyn FnOnce(OpCompletion) + Send + 'static>;

/// One pending unit of work.
///
/// An operation is single-owner at every point in time. The caller
/// builds it, the queue holds it from submission until the worker picks
/// it up, and ownership conceptually returns to the caller the instant
/// the completion fires. The engine never touches it afterward. It is
/// deliberately neither `Clone` nor `Copy`.
///
/// Read and write address a single page at sub-page granularity, so
/// `column + length` must fit in one page. Erase is block-aligned:
/// `page` and `column` must be zero and `length` counts whole blocks.
pub struct Operation {
    pub(crate) kind: OpKind,
    pub(crate) addr: NandAddr,
    pub(crate) length: u32,
    pub(crate) data: Vec<u8>,
    pub(crate) complete: CompleteFn,
}

impl Operation {
    /// Build a read of `buf.len()` bytes at `addr`. The buffer is the
    /// caller-owned destination and is handed back through the
    /// completion with the data filled in.
    pub fn read(
        addr: NandAddr,
        buf: Vec<u8>,
        on_complete: impl FnOnce(OpCompletion) + Send + 'static,
    ) -> Self {
        Self {
            kind: OpKind::Read,
            addr,
            // Saturate; a mismatched length never passes validation.
            length: u32::try_from(buf.len()).unwrap_or(u32::MAX),
            data: buf,
            complete: Box::new(on_complete),
        }
    }

    /// Build a write of `data` at `addr`.
    pub fn write(
        addr: NandAddr,
        data: Vec<u8>,
        on_complete: impl FnOnce(OpCompletion) + Send + 'static,
    ) -> Self {
        Self {
            kind: OpKind::Write,
            addr,
            length: u32::try_from(data.len()).unwrap_or(u32::MAX),
            data,
            complete: Box::new(on_complete),
        }
    }

    /// Build an erase of `num_blocks` whole blocks starting at
    /// `first_block`.
    pub fn erase(
        first_block: u32,
        num_blocks: u32,
        on_complete: impl FnOnce(OpCompletion) + Send + 'static,
    ) -> Self {
        Self {
            kind: OpKind::Erase,
            addr: NandAddr {
                block: first_block,
                page: 0,
                column: 0,
            },
            length: num_blocks,
            data: Vec::new(),
            complete: Box::new(on_complete),
        }
    }

    /// The operation's kind.
    #[must_use]
    pub fn kind(&self) -> OpKind {
        self.kind
    }

    /// The operation's target address.
    #[must_use]
    pub fn addr(&self) -> NandAddr {
        self.addr
    }

    /// Transfer length: bytes for read/write, blocks for erase.
    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Fire the completion, consuming the operation and returning buffer
    /// ownership to the caller.
    pub(crate) fn finish(self, result: Result<u32>) {
        let Self { data, complete, .. } = self;
        complete(OpCompletion { result, data });
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("kind", &self.kind)
            .field("addr", &self.addr)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}
