//! Error types for nandsim.

use thiserror::Error;

/// Errors reported by the emulator.
///
/// `InvalidArgs`, `IoError` and `Canceled` are per-operation failures and
/// travel through the operation's completion callback. `Rejected` is
/// returned synchronously to a submitter once shutdown has begun. `Fatal`
/// is only produced by [`crate::NandDevice::start`].
#[derive(Debug, Error)]
pub enum Error {
    /// Misaligned or out-of-range address/length. A caller bug, reported
    /// per-operation; the engine keeps running.
    #[error("invalid args: {0}")]
    InvalidArgs(String),

    /// The operation targets a block marked bad. No I/O is attempted.
    #[error("I/O error: {0}")]
    IoError(String),

    /// The operation was still queued when shutdown began and never ran.
    #[error("operation canceled by device shutdown")]
    Canceled,

    /// Submission attempted after shutdown began.
    #[error("submission rejected: device is shut down")]
    Rejected,

    /// Backend allocation or worker spawn failure during start. The
    /// engine does not come up.
    #[error("fatal: {0}")]
    Fatal(String),
}

impl Error {
    /// Returns true if this failure was caused by device teardown rather
    /// than by the operation itself.
    #[inline]
    #[must_use]
    pub const fn is_shutdown(&self) -> bool {
        matches!(self, Self::Canceled | Self::Rejected)
    }
}

/// Result type for emulator operations.
pub type Result<T> = std::result::Result<T, Error>;
