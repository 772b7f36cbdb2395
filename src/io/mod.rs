//! Blocking I/O side of the multiplexer.
//!
//! [`SelectReader`] is the stream handed back to callers in place of each
//! caller-supplied source; the background module drives the single prefetching read
//! that makes readiness observable.

mod background;
mod select_reader;

pub(crate) use background::BackgroundRead;
pub(crate) use select_reader::Prefetch;
pub use select_reader::{ReadPhase, SelectReader};
