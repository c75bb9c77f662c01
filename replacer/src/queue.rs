//! Bounded work queues connecting the walker to the worker pools.
//!
//! Each queue is a single-producer, multi-consumer channel of file paths.
//! The walker holds the only senders and drops them exactly once when the
//! traversal ends, which closes the channel and terminates the workers'
//! receive loops. A full queue blocks the walker, bounding memory by the
//! queue capacity.

use std::path::PathBuf;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::errors::{ReplaceError, ReplaceResult};

/// A file discovered by the walk, owned by the queue until a worker claims it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub path: PathBuf,
}

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Creates a bounded queue with the given capacity, returning the producer
/// and consumer halves.
pub fn work_queue(capacity: usize) -> (QueueSender, QueueReceiver) {
    let (sender, receiver) = bounded(capacity);
    (QueueSender { sender }, QueueReceiver { receiver })
}

/// Producer half of a work queue. Dropping every clone closes the queue.
#[derive(Debug, Clone)]
pub struct QueueSender {
    sender: Sender<WorkItem>,
}

impl QueueSender {
    /// Sends an item, blocking while the queue is full.
    ///
    /// The receivers only disappear when the workers have bailed out early,
    /// which happens solely on cancellation, so a disconnected queue is
    /// reported as `Cancelled`.
    pub fn send(&self, item: WorkItem) -> ReplaceResult<()> {
        self.sender.send(item).map_err(|_| ReplaceError::Cancelled)
    }
}

/// Consumer half of a work queue, cloned into each worker.
#[derive(Debug, Clone)]
pub struct QueueReceiver {
    receiver: Receiver<WorkItem>,
}

impl QueueReceiver {
    /// Receives the next item, blocking while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub fn recv(&self) -> Option<WorkItem> {
        self.receiver.recv().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_basic() {
        let (tx, rx) = work_queue(4);

        tx.send(WorkItem::new("/a")).unwrap();
        tx.send(WorkItem::new("/b")).unwrap();
        assert_eq!(rx.len(), 2);

        assert_eq!(rx.recv(), Some(WorkItem::new("/a")));
        assert_eq!(rx.recv(), Some(WorkItem::new("/b")));
        assert!(rx.is_empty());
    }

    #[test]
    fn test_queue_close_on_sender_drop() {
        let (tx, rx) = work_queue(4);
        tx.send(WorkItem::new("/a")).unwrap();
        drop(tx);

        // Remaining items drain, then the closed queue yields None
        assert_eq!(rx.recv(), Some(WorkItem::new("/a")));
        assert_eq!(rx.recv(), None);
    }

    #[test]
    fn test_send_after_receivers_gone_is_cancelled() {
        let (tx, rx) = work_queue(4);
        drop(rx);

        let err = tx.send(WorkItem::new("/a")).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_backpressure_blocks_until_consumed() {
        let (tx, rx) = work_queue(1);
        tx.send(WorkItem::new("/a")).unwrap();

        let handle = std::thread::spawn(move || {
            // Blocks until the consumer below makes room
            tx.send(WorkItem::new("/b")).unwrap();
        });

        assert_eq!(rx.recv(), Some(WorkItem::new("/a")));
        assert_eq!(rx.recv(), Some(WorkItem::new("/b")));
        handle.join().unwrap();
    }
}
