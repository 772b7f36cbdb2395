//! Wrapped stream that replays a prefetched chunk before reading its source.
//!
//! Each [`SelectReader`] moves through three phases:
//!
//! ```text
//! Pending ──signal──▶ Draining ──chunk exhausted──▶ PassThrough
//!    │                                                  ▲
//!    └──────────── empty prefetch (EOF / error) ────────┘
//! ```
//!
//! - **Pending**: the background read has not been collected yet. The first
//!   `read` blocks on the one-shot signal, then never blocks on it again.
//! - **Draining**: bytes from the background read are handed out.
//! - **PassThrough**: reads go straight to the source. A deferred end-of-stream
//!   or error from the background read is delivered once on entry.
//!
//! The bytes and errors seen through the wrapper are exactly those a direct
//! read of the source would have produced, whatever destination sizes are
//! used.

use crate::sync::OnceReceiver;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

/// Result of the single background read performed for a source.
pub(crate) struct Prefetch<R> {
    pub(crate) source: R,
    pub(crate) chunk: Vec<u8>,
    pub(crate) outcome: io::Result<usize>,
}

impl<R> Prefetch<R> {
    fn into_state(self) -> ReadState<R> {
        let Self {
            source,
            mut chunk,
            outcome,
        } = self;
        match outcome {
            Ok(n) if n > 0 => {
                chunk.truncate(n);
                ReadState::Draining {
                    source,
                    chunk,
                    pos: 0,
                }
            }
            Ok(_) => ReadState::Deferred {
                source,
                error: None,
            },
            Err(err) => ReadState::Deferred {
                source,
                error: Some(err),
            },
        }
    }
}

/// Observable phase of a [`SelectReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadPhase {
    /// The background read result has not been collected yet.
    Pending,
    /// Prefetched bytes remain to be handed out.
    Draining,
    /// Reads are delegated to the source.
    PassThrough,
    /// The source panicked during its background read; every read fails.
    Poisoned,
}

enum ReadState<R> {
    Pending(OnceReceiver<Prefetch<R>>),
    Draining { source: R, chunk: Vec<u8>, pos: usize },
    /// Empty prefetch whose terminal result (`None` for end-of-stream) has
    /// not been reported yet.
    Deferred { source: R, error: Option<io::Error> },
    PassThrough(R),
    Poisoned,
}

impl<R> ReadState<R> {
    fn phase(&self) -> ReadPhase {
        match self {
            Self::Pending(_) => ReadPhase::Pending,
            Self::Draining { .. } => ReadPhase::Draining,
            Self::Deferred { .. } | Self::PassThrough(_) => ReadPhase::PassThrough,
            Self::Poisoned => ReadPhase::Poisoned,
        }
    }
}

impl<R: Read> ReadState<R> {
    /// Performs one read and returns the state that follows it.
    fn step(self, dst: &mut [u8]) -> (Self, io::Result<usize>) {
        match self {
            Self::Pending(ready) => match ready.wait() {
                Ok(prefetch) => prefetch.into_state().step(dst),
                Err(_) => (Self::Poisoned, Err(poisoned())),
            },
            Self::Draining {
                source,
                chunk,
                pos,
            } => {
                let remaining = &chunk[pos..];
                let n = remaining.len().min(dst.len());
                dst[..n].copy_from_slice(&remaining[..n]);
                let pos = pos + n;
                if pos < chunk.len() {
                    (Self::Draining { source, chunk, pos }, Ok(n))
                } else {
                    (Self::PassThrough(source), Ok(n))
                }
            }
            Self::Deferred { source, error } => {
                let result = error.map_or(Ok(0), Err);
                (Self::PassThrough(source), result)
            }
            Self::PassThrough(mut source) => {
                let result = source.read(dst);
                (Self::PassThrough(source), result)
            }
            Self::Poisoned => (Self::Poisoned, Err(poisoned())),
        }
    }
}

fn poisoned() -> io::Error {
    io::Error::other("source panicked during its background read")
}

struct Shared<R> {
    index: usize,
    state: Mutex<ReadState<R>>,
}

/// Stream returned in place of a caller-supplied source.
///
/// Cloning is cheap; all clones read from the same underlying state, so the
/// handle returned by [`Select::select`](crate::Select::select) and the one
/// returned at construction are interchangeable. Concurrent reads through
/// different clones are serialized.
pub struct SelectReader<R> {
    shared: Arc<Shared<R>>,
}

impl<R> Clone for SelectReader<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R> SelectReader<R> {
    pub(crate) fn new(index: usize, ready: OnceReceiver<Prefetch<R>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                index,
                state: Mutex::new(ReadState::Pending(ready)),
            }),
        }
    }

    /// Index of the source in the sequence given at construction.
    #[must_use]
    pub fn index(&self) -> usize {
        self.shared.index
    }

    /// Returns the current read phase.
    ///
    /// Blocks while another clone is inside `read`.
    #[must_use]
    pub fn phase(&self) -> ReadPhase {
        self.shared.state.lock().phase()
    }
}

impl<R: Read> SelectReader<R> {
    fn read_shared(&self, dst: &mut [u8]) -> io::Result<usize> {
        let mut state = self.shared.state.lock();
        // A panicking source leaves the reader poisoned.
        let current = std::mem::replace(&mut *state, ReadState::Poisoned);
        let (next, result) = current.step(dst);
        *state = next;
        result
    }
}

impl<R: Read> Read for SelectReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_shared(buf)
    }
}

impl<R: Read> Read for &SelectReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_shared(buf)
    }
}

impl<R> fmt::Debug for SelectReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = self.shared.state.try_lock().map(|state| state.phase());
        f.debug_struct("SelectReader")
            .field("index", &self.shared.index)
            .field("phase", &phase)
            .finish()
    }
}
