//! Ordered mailbox between producer threads and the worker
//!
//! Unbounded FIFO guarded by one mutex and one condition variable. The
//! queue starts closed: `push` is rejected until [`EventQueue::open`] is
//! called by `init`, and again after [`EventQueue::close`] by `shutdown`.
//! The worker keeps popping after close until the queue is empty, so every
//! accepted item is delivered exactly once.

use super::log_event::LogEvent;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::thread::ThreadId;

/// Element of the queue.
///
/// Control items travel through the same total order as log events, so a
/// format change only affects events enqueued after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    Log(LogEvent),
    UpdateFormat(String),
    RevertFormat,
    RegisterLabel { thread: ThreadId, label: String },
    UnregisterLabel { thread: ThreadId },
}

impl QueueItem {
    pub fn is_control(&self) -> bool {
        !matches!(self, QueueItem::Log(_))
    }
}

#[derive(Debug)]
struct QueueState {
    items: VecDeque<QueueItem>,
    closed: bool,
}

#[derive(Debug)]
pub struct EventQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: true,
            }),
            ready: Condvar::new(),
        }
    }

    /// Accept pushes again
    pub fn open(&self) {
        self.state.lock().closed = false;
    }

    /// Append an item and wake the worker.
    ///
    /// Returns the item back if the queue is closed.
    pub fn push(&self, item: QueueItem) -> std::result::Result<(), QueueItem> {
        {
            let mut state = self.state.lock();
            if state.closed {
                return Err(item);
            }
            state.items.push_back(item);
        }
        self.ready.notify_one();
        Ok(())
    }

    /// Pop without waiting
    pub fn try_pop(&self) -> Option<QueueItem> {
        self.state.lock().items.pop_front()
    }

    /// Block until an item is available.
    ///
    /// Returns `None` only once the queue is closed and fully drained.
    pub fn pop(&self) -> Option<QueueItem> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            self.ready.wait(&mut state);
        }
    }

    /// Reject further pushes and wake the worker so it can drain and exit.
    ///
    /// The flag is set under the lock before notifying; a worker that
    /// checked the predicate cannot miss the wakeup.
    pub fn close(&self) {
        {
            let mut state = self.state.lock();
            state.closed = true;
        }
        self.ready.notify_all();
    }

    /// Discard everything still queued, returning how many items were dropped
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        let dropped = state.items.len();
        state.items.clear();
        dropped
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
