//! One-shot rendezvous between a producer thread and a single consumer.
//!
//! A signal carries exactly one value from a [`OnceSender`] to a
//! [`OnceReceiver`]. Both halves are consumed by their terminal operation, so
//! the value can be sent at most once and waited for at most once; the type
//! system enforces the one-shot property instead of a runtime flag.
//!
//! # Ownership Handoff
//!
//! Whatever the sender owned (a buffer, a stream, an error) moves to the
//! receiver through the slot. The mutex/condvar pair gives the happens-before
//! edge, so the receiver observes every write the sender made before `send`.
//!
//! # Example
//!
//! ```
//! use ioselect::sync::once_signal;
//! use std::thread;
//!
//! let (tx, rx) = once_signal::<Vec<u8>>();
//! thread::spawn(move || tx.send(b"ready".to_vec()));
//! assert_eq!(rx.wait().unwrap(), b"ready");
//! ```

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::Arc;

/// Error returned by [`OnceReceiver::wait`] when the sender was dropped
/// without sending a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("one-shot signal closed without a value")]
pub struct SignalClosed;

#[derive(Debug)]
enum Slot<T> {
    Empty,
    Full(T),
    Closed,
}

struct Inner<T> {
    slot: Mutex<Slot<T>>,
    fired: Condvar,
}

impl<T> Inner<T> {
    fn settle(&self, next: Slot<T>) {
        let mut slot = self.slot.lock();
        if matches!(*slot, Slot::Empty) {
            *slot = next;
            self.fired.notify_all();
        }
    }
}

/// Creates a connected one-shot sender/receiver pair.
#[must_use]
pub fn once_signal<T>() -> (OnceSender<T>, OnceReceiver<T>) {
    let inner = Arc::new(Inner {
        slot: Mutex::new(Slot::Empty),
        fired: Condvar::new(),
    });
    (
        OnceSender {
            inner: Some(Arc::clone(&inner)),
        },
        OnceReceiver { inner },
    )
}

/// Sending half of a one-shot signal.
///
/// Dropping the sender without calling [`send`](Self::send) closes the
/// signal, which wakes the receiver with [`SignalClosed`].
pub struct OnceSender<T> {
    inner: Option<Arc<Inner<T>>>,
}

impl<T> OnceSender<T> {
    /// Fires the signal with `value`. Never blocks.
    pub fn send(mut self, value: T) {
        if let Some(inner) = self.inner.take() {
            inner.settle(Slot::Full(value));
        }
    }
}

impl<T> Drop for OnceSender<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            inner.settle(Slot::Closed);
        }
    }
}

impl<T> fmt::Debug for OnceSender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnceSender")
            .field("sent", &self.inner.is_none())
            .finish()
    }
}

/// Receiving half of a one-shot signal.
pub struct OnceReceiver<T> {
    inner: Arc<Inner<T>>,
}

impl<T> OnceReceiver<T> {
    /// Returns true once the sender has either sent a value or been dropped.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !matches!(*self.inner.slot.lock(), Slot::Empty)
    }

    /// Blocks until the signal fires and takes its value.
    pub fn wait(self) -> Result<T, SignalClosed> {
        let mut slot = self.inner.slot.lock();
        while matches!(*slot, Slot::Empty) {
            self.inner.fired.wait(&mut slot);
        }
        match std::mem::replace(&mut *slot, Slot::Closed) {
            Slot::Full(value) => Ok(value),
            Slot::Empty | Slot::Closed => Err(SignalClosed),
        }
    }
}

impl<T> fmt::Debug for OnceReceiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnceReceiver")
            .field("ready", &self.is_ready())
            .finish()
    }
}
