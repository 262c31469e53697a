//! Thread-safe FIFO of pending operations.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::error::{Error, Result};
use crate::op::Operation;

#[derive(Default)]
struct Inner {
    ops: VecDeque<Operation>,
    dead: bool,
}

/// FIFO shared between submitter threads and the single worker.
///
/// One mutex guards both the sequence and the `dead` flag, and the wake
/// signal is paired with that lock, so setting `dead` can never race a
/// concurrent [`OpQueue::take`] into missing its wake. Insertion order is
/// dispatch order; there is no priority.
pub(crate) struct OpQueue {
    inner: Mutex<Inner>,
    wake: Condvar,
}

impl OpQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            wake: Condvar::new(),
        }
    }

    /// Append an operation and wake the worker. Fails with
    /// [`Error::Rejected`] once the queue is dead; ownership of the
    /// operation transfers to the queue on success.
    pub fn submit(&self, op: Operation) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.dead {
            return Err(Error::Rejected);
        }
        inner.ops.push_back(op);
        self.wake.notify_one();
        Ok(())
    }

    /// Dequeue the next operation, blocking until one is available or the
    /// queue is dead. While dead, remaining operations are still handed
    /// out so the worker can drain them. `None` means the queue is dead
    /// and empty, and tells the worker to exit.
    pub fn take(&self) -> Option<Operation> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(op) = inner.ops.pop_front() {
                return Some(op);
            }
            if inner.dead {
                return None;
            }
            self.wake.wait(&mut inner);
        }
    }

    /// Mark the queue dead and wake any blocked [`OpQueue::take`].
    /// Idempotent.
    pub fn kill(&self) {
        let mut inner = self.inner.lock();
        inner.dead = true;
        self.wake.notify_all();
    }

    /// True once [`OpQueue::kill`] has run. The worker uses this to
    /// switch from executing to draining.
    pub fn is_dead(&self) -> bool {
        self.inner.lock().dead
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().ops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::NandAddr;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Duration;

    fn noop_write(tag: u8) -> Operation {
        Operation::write(
            NandAddr {
                block: 0,
                page: 0,
                column: 0,
            },
            vec![tag],
            |_| {},
        )
    }

    #[test]
    fn test_submit_then_take_fifo() {
        let queue = OpQueue::new();
        for tag in 0..4 {
            queue.submit(noop_write(tag)).unwrap();
        }
        assert_eq!(queue.len(), 4);
        for tag in 0..4 {
            let op = queue.take().unwrap();
            assert_eq!(op.data, vec![tag]);
        }
    }

    #[test]
    fn test_take_blocks_until_submit() {
        let queue = Arc::new(OpQueue::new());
        let (tx, rx) = mpsc::channel();

        let taker = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                let op = queue.take();
                tx.send(op.is_some()).unwrap();
            })
        };

        // The taker should be parked, not returning.
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        queue.submit(noop_write(1)).unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap());
        taker.join().unwrap();
    }

    #[test]
    fn test_kill_wakes_blocked_take() {
        let queue = Arc::new(OpQueue::new());
        let taker = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || queue.take())
        };
        // Give the taker a moment to park on the condvar.
        std::thread::sleep(Duration::from_millis(20));
        queue.kill();
        assert!(taker.join().unwrap().is_none());
    }

    #[test]
    fn test_submit_after_kill_is_rejected() {
        let queue = OpQueue::new();
        queue.kill();
        assert!(matches!(queue.submit(noop_write(0)), Err(Error::Rejected)));
    }

    #[test]
    fn test_take_drains_remaining_after_kill() {
        let queue = OpQueue::new();
        queue.submit(noop_write(1)).unwrap();
        queue.submit(noop_write(2)).unwrap();
        queue.kill();
        assert!(queue.is_dead());
        assert!(queue.take().is_some());
        assert!(queue.take().is_some());
        assert!(queue.take().is_none());
    }

    #[test]
    fn test_kill_is_idempotent() {
        let queue = OpQueue::new();
        queue.kill();
        queue.kill();
        assert!(queue.is_dead());
        assert!(queue.take().is_none());
    }

    #[test]
    fn test_concurrent_submitters_all_accepted() {
        let queue = Arc::new(OpQueue::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    for tag in 0..100 {
                        queue.submit(noop_write(tag)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(queue.len(), 800);
    }
}
