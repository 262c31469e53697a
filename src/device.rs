//! Device surface and lifecycle control.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::badblock::BadBlockTable;
use crate::error::{Error, Result};
use crate::geometry::NandGeometry;
use crate::op::Operation;
use crate::queue::OpQueue;
use crate::storage::RamStorage;
use crate::worker::Worker;

/// Removal notification supplied by the host layer, fired exactly once
/// when the device is torn down.
pub type RemoveCallback = Box<dyn FnOnce() + Send + 'static>;

/// Descriptor returned by [`NandDevice::start`]; the host uses it to
/// publish the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    /// The geometry the device was built with.
    pub geometry: NandGeometry,
    /// Size of the mapped RAM region backing the chip, in bytes.
    pub total_size: u64,
}

#[derive(Default)]
struct Lifecycle {
    stopped: bool,
    worker: Option<JoinHandle<()>>,
    remove: Option<RemoveCallback>,
}

/// A RAM-backed emulated NAND chip.
///
/// Construction yields an un-started handle; [`NandDevice::start`] maps
/// the backing store and spawns the worker, [`NandDevice::stop`] tears
/// both down. Submission and administrative queries are safe to call from
/// any thread and never block on operation completion; results arrive
/// through each operation's own completion callback, in submission order.
/// Operations are accepted only while the worker is running, so every
/// accepted operation reaches exactly one terminal status.
///
/// # Example
///
/// ```
/// use nandsim::{NandAddr, NandDevice, NandGeometry, Operation};
/// use std::sync::mpsc;
///
/// let device = NandDevice::new(NandGeometry::new(4096, 64, 32, 8));
/// device.start(Box::new(|| {})).unwrap();
///
/// let (tx, rx) = mpsc::channel();
/// let addr = NandAddr { block: 2, page: 0, column: 0 };
/// device
///     .submit(Operation::write(addr, vec![0xAB; 4096], move |done| {
///         tx.send(done.result).unwrap();
///     }))
///     .unwrap();
/// assert_eq!(rx.recv().unwrap().unwrap(), 4096);
/// device.stop();
/// ```
pub struct NandDevice {
    geometry: NandGeometry,
    queue: Arc<OpQueue>,
    bad_blocks: Arc<BadBlockTable>,
    started: AtomicBool,
    lifecycle: Mutex<Lifecycle>,
}

impl NandDevice {
    /// Build the engine in an un-started state. No memory is mapped and
    /// no thread exists until [`NandDevice::start`].
    #[must_use]
    pub fn new(geometry: NandGeometry) -> Self {
        Self {
            geometry,
            queue: Arc::new(OpQueue::new()),
            bad_blocks: Arc::new(BadBlockTable::new()),
            started: AtomicBool::new(false),
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Map the backing store and spawn the worker thread.
    ///
    /// `remove_callback` is fired exactly once, from [`NandDevice::stop`].
    /// On spawn failure the backing store is released, no thread is left
    /// running, and submissions stay rejected. A second `start` fails
    /// with [`Error::Fatal`]; re-geometry goes through teardown and
    /// reconstruction.
    ///
    /// # Errors
    ///
    /// [`Error::Fatal`] if the device was already started or the worker
    /// thread cannot be spawned.
    pub fn start(&self, remove_callback: RemoveCallback) -> Result<DeviceInfo> {
        let mut lifecycle = self.lifecycle.lock();
        if self.started.load(Ordering::Acquire) {
            return Err(Error::Fatal("device already started".to_string()));
        }

        let total_size = self.geometry.total_size();
        let storage = RamStorage::new(total_size);
        let worker = Worker::new(
            self.geometry,
            storage,
            Arc::clone(&self.queue),
            Arc::clone(&self.bad_blocks),
        );

        // If the spawn fails the closure, and the storage inside it, are
        // dropped before we return.
        let handle = thread::Builder::new()
            .name("nandsim-worker".to_string())
            .spawn(move || worker.run())
            .map_err(|e| Error::Fatal(format!("failed to spawn worker thread: {e}")))?;

        lifecycle.worker = Some(handle);
        lifecycle.remove = Some(remove_callback);
        self.started.store(true, Ordering::Release);
        info!(total_size, "nand device started");

        Ok(DeviceInfo {
            geometry: self.geometry,
            total_size,
        })
    }

    /// Tear the device down: mark the queue dead, wake the worker, let it
    /// drain (canceling all pending work), join it, then fire the removal
    /// callback.
    ///
    /// Idempotent: a second call, or a call on a never-started device, is
    /// a no-op. The removal callback fires exactly once.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if !self.started.load(Ordering::Acquire) || lifecycle.stopped {
            return;
        }
        lifecycle.stopped = true;

        debug!("stopping nand device");
        self.queue.kill();
        if let Some(handle) = lifecycle.worker.take() {
            if handle.join().is_err() {
                warn!("worker thread panicked during shutdown");
            }
        }
        if let Some(remove) = lifecycle.remove.take() {
            remove();
        }
        info!("nand device stopped");
    }

    /// The device geometry plus the per-operation bookkeeping size a
    /// caller must account for when sizing operation pools.
    #[must_use]
    pub fn query(&self) -> (NandGeometry, usize) {
        (self.geometry, std::mem::size_of::<Operation>())
    }

    /// The device geometry.
    #[must_use]
    pub fn geometry(&self) -> NandGeometry {
        self.geometry
    }

    /// Queue an operation for the worker. Fire-and-forget: the terminal
    /// status arrives through the operation's completion callback.
    ///
    /// # Errors
    ///
    /// [`Error::Rejected`], synchronously, before [`NandDevice::start`]
    /// and once shutdown has begun. A rejected operation never entered
    /// the queue and its completion callback does not fire; the
    /// synchronous error is its one terminal status.
    pub fn submit(&self, op: Operation) -> Result<()> {
        if !self.started.load(Ordering::Acquire) {
            return Err(Error::Rejected);
        }
        self.queue.submit(op)
    }

    /// Flag a block as bad. Idempotent. Declared by the caller, never
    /// discovered by the worker.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgs`] if `block` is outside the geometry.
    pub fn mark_bad(&self, block: u32) -> Result<()> {
        if block >= self.geometry.num_blocks {
            return Err(Error::InvalidArgs(format!(
                "block {block} outside geometry of {} blocks",
                self.geometry.num_blocks
            )));
        }
        self.bad_blocks.mark_bad(block);
        Ok(())
    }

    /// List bad blocks, sorted and truncated to `capacity`; the second
    /// value is the true total so truncation is detectable.
    #[must_use]
    pub fn list_bad_blocks(&self, capacity: usize) -> (Vec<u32>, u32) {
        self.bad_blocks.list(capacity)
    }
}

impl Drop for NandDevice {
    fn drop(&mut self) {
        self.stop();
    }
}
