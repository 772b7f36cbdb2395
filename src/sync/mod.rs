//! Blocking synchronization primitives used by the multiplexer.
//!
//! - [`once_signal`]: single-assignment rendezvous that hands a value from a
//!   worker thread to exactly one consumer.
//! - [`FanIn`]: many producers, one logical consumer, with deadline-bounded
//!   receive that never drops an event on timeout.

mod fan_in;
mod once_signal;

pub use fan_in::FanIn;
pub use once_signal::{OnceReceiver, OnceSender, SignalClosed, once_signal};
