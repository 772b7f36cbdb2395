//! Error types for building a [`Select`](crate::Select).
//!
//! Errors produced by the wrapped sources themselves are plain
//! [`std::io::Error`] values and reach the caller through
//! [`SelectReader`](crate::SelectReader) reads, exactly where a direct read
//! would have reported them.

use std::io;

/// Error returned when a multiplexer cannot be constructed.
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    /// The configuration was rejected before any worker was started.
    #[error("invalid select configuration: {0}")]
    InvalidConfig(&'static str),
    /// The background reader thread for a source could not be spawned.
    #[error("failed to spawn background reader for source {index}")]
    Spawn {
        /// Index of the source whose worker failed to start.
        index: usize,
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },
}

impl SelectError {
    /// Returns true if this error came from configuration validation.
    #[must_use]
    pub const fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }
}
