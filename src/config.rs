//! Multiplexer configuration.
//!
//! [`SelectConfig`] holds the knobs that shape the per-source background
//! readers. [`SelectBuilder`] is the fluent entry point that validates a
//! configuration and starts the workers.
//!
//! # Example
//!
//! ```
//! use ioselect::SelectBuilder;
//! use std::io::{Cursor, Read};
//!
//! let (select, _readers) = SelectBuilder::new()
//!     .buffer_size(16)
//!     .thread_name("pipe-reader")
//!     .build(vec![Cursor::new(b"hello".to_vec())])?;
//!
//! let mut ready = select.select();
//! let mut out = String::new();
//! ready.reader.read_to_string(&mut out)?;
//! assert_eq!(out, "hello");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::SelectError;
use crate::select::Select;
use crate::io::SelectReader;
use std::io::Read;

/// Size of the buffer used for each source's single background read.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Name prefix for background reader threads.
pub const DEFAULT_THREAD_NAME: &str = "ioselect-reader";

/// Configuration for the background readers started by a [`Select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectConfig {
    /// Capacity of the buffer handed to the single background read.
    pub buffer_size: usize,
    /// Worker threads are named `"{thread_name}-{index}"`.
    pub thread_name: String,
    /// Stack size for worker threads; `None` uses the platform default.
    pub stack_size: Option<usize>,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            stack_size: None,
        }
    }
}

impl SelectConfig {
    /// Checks the configuration for values no worker could run with.
    pub fn validate(&self) -> Result<(), SelectError> {
        if self.buffer_size == 0 {
            return Err(SelectError::InvalidConfig("buffer size must be non-zero"));
        }
        if self.thread_name.is_empty() {
            return Err(SelectError::InvalidConfig("thread name must not be empty"));
        }
        if self.thread_name.contains('\0') {
            return Err(SelectError::InvalidConfig("thread name must not contain NUL"));
        }
        if self.stack_size == Some(0) {
            return Err(SelectError::InvalidConfig("stack size must be non-zero"));
        }
        Ok(())
    }

    pub(crate) fn worker_name(&self, index: usize) -> String {
        format!("{}-{index}", self.thread_name)
    }
}

/// Fluent builder for a [`Select`] and its wrapped readers.
#[derive(Debug, Clone, Default)]
#[must_use = "builders do nothing until `build` is called"]
pub struct SelectBuilder {
    config: SelectConfig,
}

impl SelectBuilder {
    /// Starts from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an explicit configuration.
    pub fn from_config(config: SelectConfig) -> Self {
        Self { config }
    }

    /// Sets the capacity of each source's background read buffer.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size;
        self
    }

    /// Sets the worker thread name prefix.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.thread_name = name.into();
        self
    }

    /// Sets the worker thread stack size.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    /// Returns the configuration built so far.
    #[must_use]
    pub fn config(&self) -> &SelectConfig {
        &self.config
    }

    /// Validates the configuration, takes ownership of `sources` and starts
    /// one background reader per source.
    ///
    /// The returned readers are index-aligned with `sources` and must be used
    /// in place of the sources themselves.
    pub fn build<R, I>(self, sources: I) -> Result<(Select<R>, Vec<SelectReader<R>>), SelectError>
    where
        R: Read + Send + 'static,
        I: IntoIterator<Item = R>,
    {
        self.config.validate()?;
        Select::start(&self.config, sources)
    }
}
