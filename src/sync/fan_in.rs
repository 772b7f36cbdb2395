//! Fan-in queue merging events from many producer threads.
//!
//! Producers push without blocking; consumers pop in arrival order and may
//! wait forever, until a deadline, or not at all. A consumer that gives up at
//! its deadline leaves the queue untouched, so an event that was about to be
//! delivered stays queued for the next receive.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::Instant;

/// Unbounded multi-producer queue with blocking and deadline-bounded receive.
#[derive(Debug)]
pub struct FanIn<T> {
    queue: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> FanIn<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    /// Returns the number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns true if no events are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Enqueues an event and wakes one waiting consumer.
    pub fn push(&self, event: T) {
        self.queue.lock().push_back(event);
        self.available.notify_one();
    }

    /// Blocks until an event is available and removes it.
    pub fn recv(&self) -> T {
        let mut queue = self.queue.lock();
        loop {
            if let Some(event) = queue.pop_front() {
                return event;
            }
            self.available.wait(&mut queue);
        }
    }

    /// Blocks until an event is available or `deadline` passes.
    ///
    /// Returns `None` on timeout without removing anything.
    pub fn recv_deadline(&self, deadline: Instant) -> Option<T> {
        let mut queue = self.queue.lock();
        loop {
            if let Some(event) = queue.pop_front() {
                return Some(event);
            }
            if self.available.wait_until(&mut queue, deadline).timed_out() {
                return queue.pop_front();
            }
        }
    }

    /// Removes the next event if one is queued. Never blocks.
    pub fn try_recv(&self) -> Option<T> {
        self.queue.lock().pop_front()
    }
}

impl<T> Default for FanIn<T> {
    fn default() -> Self {
        Self::new()
    }
}
