//! Ioselect: `select`-style readiness over blocking `std::io::Read` sources.
//!
//! # Overview
//!
//! Many byte sources (pipes, sockets wrapped in blocking adapters, serial
//! ports, child-process stdio) only offer a blocking `read`. Ioselect lets a
//! caller wait on several of them at once and learn which one produced data
//! first, optionally bounded by a timeout, without losing a single byte.
//!
//! Each source is moved onto its own worker thread, which performs exactly one
//! blocking read. The bytes from that read are handed, together with the
//! source itself, to a [`SelectReader`] that replays them before reading the
//! source directly. Completion events from all workers are fanned into one
//! queue that [`Select`] waits on.
//!
//! # Core Guarantees
//!
//! - **Read-transparency**: a `SelectReader` yields the same bytes and errors,
//!   in the same order, as reading the source directly would have.
//! - **Exactly-once readiness**: every source is reported by [`Select`] once.
//! - **Lossless timeouts**: a timed wait that expires consumes nothing.
//! - **No cancellation**: a source that never becomes readable keeps its
//!   worker thread blocked for the life of the process.
//!
//! # Module Structure
//!
//! - [`select`]: The multiplexer and its wait operations
//! - [`io`]: The wrapped stream and the per-source background reader
//! - [`sync`]: One-shot rendezvous and fan-in queue
//! - [`config`]: Worker configuration and the fluent builder
//! - [`error`](mod@error): Error types
//!
//! # Example
//!
//! ```
//! use ioselect::Select;
//! use std::io::{Cursor, Read};
//!
//! let (select, _readers) = Select::new(vec![Cursor::new(b"hello\n".to_vec())])?;
//! let mut ready = select.select();
//! let mut line = String::new();
//! ready.reader.read_to_string(&mut line)?;
//! assert_eq!((ready.index, line.as_str()), (0, "hello\n"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod error;
pub mod io;
pub mod select;
pub mod sync;
mod tracing_compat;

#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

pub use config::{SelectBuilder, SelectConfig};
pub use error::SelectError;
pub use io::{ReadPhase, SelectReader};
pub use select::{Ready, Select};
