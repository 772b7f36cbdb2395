//! The multiplexer: learn which blocking source became readable first.
//!
//! [`Select`] starts one background reader per source and collects their
//! completion events on a single fan-in queue. Each source is reported exactly
//! once over the multiplexer's lifetime, in the order its first read
//! completed.
//!
//! # Timeouts
//!
//! A timed wait that expires returns `None` and consumes nothing. A source
//! that completes after the deadline is reported by the next wait. Timeouts
//! never cancel background reads: a source that never becomes readable keeps
//! its worker thread parked in `read` for the life of the process.
//!
//! # Example
//!
//! ```
//! use ioselect::Select;
//! use std::io::{Cursor, Read};
//! use std::time::Duration;
//!
//! let sources = vec![Cursor::new(b"one".to_vec()), Cursor::new(b"two".to_vec())];
//! let (select, _readers) = Select::new(sources)?;
//!
//! let mut seen = Vec::new();
//! while let Some(mut ready) = select.select_timeout(Duration::from_secs(5)) {
//!     let mut text = String::new();
//!     ready.reader.read_to_string(&mut text)?;
//!     seen.push((ready.index, text));
//!     if select.remaining() == 0 {
//!         break;
//!     }
//! }
//! seen.sort();
//! assert_eq!(seen, [(0, "one".to_owned()), (1, "two".to_owned())]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::config::SelectConfig;
use crate::error::SelectError;
use crate::io::{BackgroundRead, SelectReader};
use crate::sync::{FanIn, once_signal};
use crate::tracing_compat::{debug, trace};
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// A source whose background read has completed.
pub struct Ready<R> {
    /// Index of the source in the sequence given at construction.
    pub index: usize,
    /// The wrapped stream for that source.
    pub reader: SelectReader<R>,
}

impl<R> Ready<R> {
    /// Splits into `(index, reader)`.
    #[must_use]
    pub fn into_parts(self) -> (usize, SelectReader<R>) {
        (self.index, self.reader)
    }
}

impl<R> fmt::Debug for Ready<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ready")
            .field("index", &self.index)
            .field("reader", &self.reader)
            .finish()
    }
}

/// Readiness multiplexer over blocking sources.
pub struct Select<R> {
    events: Arc<FanIn<Ready<R>>>,
    sources: usize,
    delivered: AtomicUsize,
}

impl<R: Read + Send + 'static> Select<R> {
    /// Takes ownership of `sources` and starts one background reader per
    /// source with the default configuration.
    ///
    /// The returned readers are index-aligned with `sources` and replace them;
    /// see [`SelectBuilder`](crate::SelectBuilder) for tuning.
    pub fn new<I>(sources: I) -> Result<(Self, Vec<SelectReader<R>>), SelectError>
    where
        I: IntoIterator<Item = R>,
    {
        let config = SelectConfig::default();
        Self::start(&config, sources)
    }

    pub(crate) fn start<I>(
        config: &SelectConfig,
        sources: I,
    ) -> Result<(Self, Vec<SelectReader<R>>), SelectError>
    where
        I: IntoIterator<Item = R>,
    {
        let events = Arc::new(FanIn::new());
        let mut readers = Vec::new();
        for (index, source) in sources.into_iter().enumerate() {
            let (ready, receiver) = once_signal();
            let reader = SelectReader::new(index, receiver);
            BackgroundRead::new(
                index,
                source,
                config.buffer_size,
                ready,
                reader.clone(),
                Arc::clone(&events),
            )
            .spawn(config)
            .map_err(|source| SelectError::Spawn { index, source })?;
            readers.push(reader);
        }
        debug!(
            sources = readers.len(),
            buffer_size = config.buffer_size,
            "select started"
        );
        let select = Self {
            events,
            sources: readers.len(),
            delivered: AtomicUsize::new(0),
        };
        Ok((select, readers))
    }
}

impl<R> Select<R> {
    /// Blocks until some source is ready and returns it.
    ///
    /// Each source is returned once. Calling this after every source has been
    /// returned blocks forever.
    pub fn select(&self) -> Ready<R> {
        let ready = self.events.recv();
        self.record_delivery(ready)
    }

    /// Like [`select`](Self::select), but gives up after `timeout`.
    ///
    /// Returns `None` if no source became ready in time. Nothing is consumed
    /// on timeout.
    pub fn select_timeout(&self, timeout: Duration) -> Option<Ready<R>> {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.select_deadline(deadline),
            None => Some(self.select()),
        }
    }

    /// Like [`select`](Self::select), but gives up at `deadline`.
    pub fn select_deadline(&self, deadline: Instant) -> Option<Ready<R>> {
        let ready = self.events.recv_deadline(deadline);
        if ready.is_none() {
            trace!(remaining = self.remaining(), "select timed out");
        }
        ready.map(|ready| self.record_delivery(ready))
    }

    /// Returns a ready source if one is queued. Never blocks.
    pub fn try_select(&self) -> Option<Ready<R>> {
        self.events.try_recv().map(|ready| self.record_delivery(ready))
    }

    /// Number of sources given at construction.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources
    }

    /// Returns true if the multiplexer was built over no sources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources == 0
    }

    /// Number of sources not yet returned by a wait.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.sources - self.delivered.load(Ordering::Acquire)
    }

    fn record_delivery(&self, ready: Ready<R>) -> Ready<R> {
        self.delivered.fetch_add(1, Ordering::AcqRel);
        trace!(index = ready.index, "source ready");
        ready
    }
}

impl<R> fmt::Debug for Select<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Select")
            .field("sources", &self.sources)
            .field("remaining", &self.remaining())
            .field("queued", &self.events.len())
            .finish()
    }
}
