//! Per-source background reader.
//!
//! Each worker owns its source for exactly one blocking `read`, then hands the
//! source, the bytes and the outcome to the matching [`SelectReader`] through
//! a one-shot signal and announces completion on the shared fan-in queue. The
//! signal is always sent before the completion event, so a reader obtained
//! from the multiplexer never waits on it.

use crate::config::SelectConfig;
use crate::io::{Prefetch, SelectReader};
use crate::select::Ready;
use crate::sync::{FanIn, OnceSender};
use crate::tracing_compat::{trace, warn};
use std::io::{self, Read};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

pub(crate) struct BackgroundRead<R> {
    index: usize,
    source: R,
    buffer_size: usize,
    ready: OnceSender<Prefetch<R>>,
    reader: SelectReader<R>,
    events: Arc<FanIn<Ready<R>>>,
}

impl<R: Read + Send + 'static> BackgroundRead<R> {
    pub(crate) fn new(
        index: usize,
        source: R,
        buffer_size: usize,
        ready: OnceSender<Prefetch<R>>,
        reader: SelectReader<R>,
        events: Arc<FanIn<Ready<R>>>,
    ) -> Self {
        Self {
            index,
            source,
            buffer_size,
            ready,
            reader,
            events,
        }
    }

    /// Starts the worker on its own thread. The handle is detached: a source
    /// that never returns from `read` keeps its worker alive indefinitely.
    pub(crate) fn spawn(self, config: &SelectConfig) -> io::Result<()> {
        let mut builder = thread::Builder::new().name(config.worker_name(self.index));
        if let Some(size) = config.stack_size {
            builder = builder.stack_size(size);
        }
        builder.spawn(move || self.run()).map(drop)
    }

    fn run(self) {
        let Self {
            index,
            mut source,
            buffer_size,
            ready,
            reader,
            events,
        } = self;

        let mut chunk = vec![0_u8; buffer_size];
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| source.read(&mut chunk)));
        match outcome {
            Ok(outcome) => {
                trace!(
                    index,
                    bytes = outcome.as_ref().map_or(0, |n| *n),
                    failed = outcome.is_err(),
                    "background read complete"
                );
                ready.send(Prefetch {
                    source,
                    chunk,
                    outcome,
                });
            }
            Err(_) => {
                warn!(index, "source panicked during background read");
                drop(ready);
            }
        }
        events.push(Ready { index, reader });
    }
}
