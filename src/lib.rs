//! RAM-backed NAND flash emulator.
//!
//! This crate emulates a NAND flash chip entirely in RAM, exposing the
//! page/block command surface a real controller would present: callers
//! submit read, write, and erase operations; a single worker thread
//! drains them in FIFO order against the backing store and reports each
//! result through the operation's own completion callback. Bad blocks
//! are declared administratively and consulted before every access.
//!
//! Higher layers (flash translation layers, file systems, bad-block
//! managers) can be developed and tested against it without hardware.
//! There are no durability guarantees: "persistence" is the lifetime of
//! the RAM region.
//!
//! # Example
//!
//! ```
//! use nandsim::{NandAddr, NandDevice, NandGeometry, Operation};
//! use std::sync::mpsc;
//!
//! let device = NandDevice::new(NandGeometry::new(4096, 64, 1024, 8));
//! let info = device.start(Box::new(|| {})).unwrap();
//! assert_eq!(info.total_size, 268_435_456);
//!
//! let addr = NandAddr { block: 2, page: 0, column: 0 };
//! let (tx, rx) = mpsc::channel();
//! device
//!     .submit(Operation::write(addr, vec![0xAB; 4096], move |done| {
//!         tx.send(done.result).unwrap();
//!     }))
//!     .unwrap();
//! assert_eq!(rx.recv().unwrap().unwrap(), 4096);
//!
//! device.stop();
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod badblock;
mod device;
mod error;
mod geometry;
mod op;
mod queue;
mod storage;
mod worker;

pub use badblock::BadBlockTable;
pub use device::{DeviceInfo, NandDevice, RemoveCallback};
pub use error::{Error, Result};
pub use geometry::NandGeometry;
pub use op::{NandAddr, OpCompletion, OpKind, Operation};
pub use storage::{RamStorage, ERASE_FILL};
